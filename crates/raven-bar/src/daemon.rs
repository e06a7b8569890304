use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use ahash::AHashMap;
use compact_str::CompactString;
use glib::ControlFlow;
use gtk4::prelude::*;
use gtk4::{gdk, gio, Application};
use tracing::{debug, error, info, warn};

use raven_bar_components::{
    layer_shell_supported, BarView, GtkBar, GtkBarWindow, GtkDisplay, GtkModuleFactory,
    StyleManager,
};
use raven_bar_core::{
    load_bar_configs, BarCommand, BarConfig, BarEvent, ConfigPaths, IpcRequest, ServiceHub,
};

const APP_ID: &str = "org.ravenlinux.bar";

type SharedBar = Rc<RefCell<GtkBar>>;

/// Every bar of the session, keyed by monitor connector
struct Daemon {
    app: Application,
    configs: Vec<BarConfig>,
    factory: GtkModuleFactory,
    bars: AHashMap<CompactString, Vec<SharedBar>>,
    style: Option<StyleManager>,
    _hold: gio::ApplicationHoldGuard,
}

/// Run the bar until the application quits
pub fn run(paths: ConfigPaths) -> anyhow::Result<()> {
    let configs = load_bar_configs(&paths.config)?;
    if configs.is_empty() {
        anyhow::bail!("no usable bar configuration in {:?}", paths.config);
    }

    // Create service hub (starts tokio runtime and services)
    let services = Arc::new(ServiceHub::new(&paths)?);
    let _guard = services.enter_runtime();

    let app = Application::builder()
        .application_id(APP_ID)
        .flags(gio::ApplicationFlags::NON_UNIQUE)
        .build();

    let services_clone = services.clone();
    let paths_clone = paths.clone();
    app.connect_activate(move |app| {
        activate(app, &services_clone, configs.clone(), &paths_clone);
    });

    // Arguments were already parsed by clap
    let exit_code = app.run_with_args::<&str>(&[]);

    info!("raven-bar exiting");
    if let Err(e) = std::fs::remove_file(&paths.socket) {
        debug!("Could not remove socket {:?}: {}", paths.socket, e);
    }
    std::process::exit(exit_code.into());
}

fn activate(app: &Application, services: &ServiceHub, configs: Vec<BarConfig>, paths: &ConfigPaths) {
    if !layer_shell_supported() {
        warn!("Compositor does not support layer-shell, bars will be regular windows");
    }

    let Some(display) = gdk::Display::default() else {
        error!("No display available");
        return;
    };

    let daemon = Rc::new(RefCell::new(Daemon {
        app: app.clone(),
        configs,
        factory: GtkModuleFactory::new(services.handle()),
        bars: AHashMap::new(),
        style: StyleManager::install(&paths.style),
        _hold: app.hold(),
    }));

    let monitors = display.monitors();
    for position in 0..monitors.n_items() {
        if let Some(monitor) = monitors.item(position).and_downcast::<gdk::Monitor>() {
            add_monitor(&daemon, &monitor);
        }
    }

    // Removed monitors invalidate themselves, only additions matter here
    let weak = Rc::downgrade(&daemon);
    monitors.connect_items_changed(move |list, position, _removed, added| {
        let Some(daemon) = weak.upgrade() else {
            return;
        };
        for i in position..position + added {
            if let Some(monitor) = list.item(i).and_downcast::<gdk::Monitor>() {
                add_monitor(&daemon, &monitor);
            }
        }
    });

    let weak = Rc::downgrade(&daemon);
    glib::unix_signal_add_local(libc::SIGUSR1, move || {
        if let Some(daemon) = weak.upgrade() {
            daemon.borrow().toggle_all();
        }
        ControlFlow::Continue
    });

    for signal in [libc::SIGINT, libc::SIGTERM] {
        let app = app.clone();
        glib::unix_signal_add_local(signal, move || {
            info!("Received signal {}, quitting", signal);
            app.quit();
            ControlFlow::Break
        });
    }

    // Start event dispatch loop
    let event_rx = services.event_receiver();
    let weak = Rc::downgrade(&daemon);
    glib::spawn_future_local(async move {
        while let Ok(event) = event_rx.recv().await {
            let Some(daemon) = weak.upgrade() else {
                break;
            };
            daemon.borrow().handle_event(event);
        }
    });

    if daemon.borrow().bars.is_empty() {
        warn!("No monitor matched any bar configuration");
    }
    info!("raven-bar activated");
}

fn add_monitor(daemon: &Rc<RefCell<Daemon>>, monitor: &gdk::Monitor) {
    let Some(connector) = monitor.connector() else {
        warn!("Ignoring monitor without a connector name");
        return;
    };
    let connector = CompactString::from(connector.as_str());

    let bars: Vec<SharedBar> = {
        let daemon = daemon.borrow();
        daemon
            .configs
            .iter()
            .filter(|config| config.outputs.matches(&connector))
            .map(|config| create_bar(&daemon, config.clone(), &connector, monitor))
            .collect()
    };
    if bars.is_empty() {
        debug!("No bar configured for {}", connector);
        return;
    }

    let weak = Rc::downgrade(daemon);
    let invalidated = connector.clone();
    monitor.connect_invalidate(move |_| {
        let Some(daemon) = weak.upgrade() else {
            return;
        };
        match daemon.try_borrow_mut() {
            Ok(mut daemon) => daemon.remove_monitor(&invalidated),
            Err(_) => error!("Monitor {} invalidated while busy", invalidated),
        };
    });

    info!("Created {} bar(s) on {}", bars.len(), connector);
    daemon
        .borrow_mut()
        .bars
        .entry(connector)
        .or_default()
        .extend(bars);
}

fn create_bar(
    daemon: &Daemon,
    mut config: BarConfig,
    connector: &str,
    monitor: &gdk::Monitor,
) -> SharedBar {
    if !config.gtk_layer_shell {
        warn!(
            "{}: raw layer surfaces need their own Wayland connection, using gtk4-layer-shell",
            connector
        );
        config.gtk_layer_shell = true;
    }

    let window = GtkBarWindow::new(&daemon.app, monitor);
    let mut bar = GtkBar::new(config, connector, window, &daemon.factory);

    let view = BarView::build(bar.modules(), bar.geometry().is_vertical());
    bar.window().set_child(Some(view.widget()));
    bar.window().present();
    if let Err(e) = bar.on_map(&GtkDisplay) {
        error!("{}: {}", connector, e);
    }

    let gtk_window = bar.window().window().clone();
    let bar = Rc::new(RefCell::new(bar));
    watch_layout(&gtk_window, Rc::downgrade(&bar));
    bar
}

/// Feed the size the compositor settled on back into the bar geometry
fn watch_layout(window: &gtk4::ApplicationWindow, bar: Weak<RefCell<GtkBar>>) {
    let Some(surface) = window.surface() else {
        warn!("Bar window has no surface after present");
        return;
    };
    surface.connect_layout(move |_, width, height| {
        let Some(bar) = bar.upgrade() else {
            return;
        };
        let Ok(mut bar) = bar.try_borrow_mut() else {
            debug!("Layout while bar is busy, skipping");
            return;
        };
        if bar.is_closed() {
            return;
        }
        bar.on_toolkit_configure(width.max(0) as u32, height.max(0) as u32);
    });
}

impl Daemon {
    fn all_bars(&self) -> impl Iterator<Item = &SharedBar> {
        self.bars.values().flatten()
    }

    fn toggle_all(&self) {
        for bar in self.all_bars() {
            match bar.try_borrow_mut() {
                Ok(mut bar) if !bar.is_closed() => {
                    bar.toggle();
                }
                Ok(_) => {}
                Err(_) => warn!("Bar busy, not toggled"),
            }
        }
    }

    fn remove_monitor(&mut self, connector: &str) {
        let Some(bars) = self.bars.remove(connector) else {
            return;
        };
        info!("Monitor {} removed, closing {} bar(s)", connector, bars.len());
        for bar in bars {
            match bar.try_borrow_mut() {
                Ok(mut bar) => bar.close(),
                Err(_) => error!("Bar on {} busy while closing", connector),
            }
        }
    }

    fn handle_event(&self, event: BarEvent) {
        match event {
            BarEvent::Request(request) => self.handle_request(request),
            BarEvent::StyleChanged => self.reload_style(),
        }
    }

    fn handle_request(&self, request: IpcRequest) {
        let response = match request.command {
            BarCommand::Toggle => {
                self.toggle_all();
                "ok".to_string()
            }
            BarCommand::Signal(signal) => {
                let refreshed: usize = self
                    .all_bars()
                    .filter_map(|bar| bar.try_borrow().ok())
                    .map(|bar| bar.handle_signal(signal))
                    .sum();
                format!("ok: {} modules refreshed", refreshed)
            }
            BarCommand::Status => {
                let lines: Vec<String> = self
                    .all_bars()
                    .filter_map(|bar| bar.try_borrow().ok())
                    .map(|bar| bar.status().to_string())
                    .collect();
                if lines.is_empty() {
                    "no bars".to_string()
                } else {
                    lines.join("\n")
                }
            }
            BarCommand::ReloadStyle => {
                self.reload_style();
                "ok".to_string()
            }
        };
        request.respond(response);
    }

    fn reload_style(&self) {
        match &self.style {
            Some(style) => style.reload(),
            None => warn!("No style manager, ignoring reload"),
        }
    }
}
