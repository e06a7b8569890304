use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use compact_str::CompactString;
use glib::ControlFlow;
use serde_json::Value;
use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::debug;

use raven_bar_core::{Module, ModuleError, Refresh, UpdateSignal};

use super::{format_string, GtkModule, ModuleLabel};

type ExecResult = Result<String, String>;

/// Runs the configured command off the main loop and posts its output back
#[derive(Clone)]
struct Runner {
    name: CompactString,
    exec: Arc<str>,
    runtime: Handle,
    tx: async_channel::Sender<ExecResult>,
}

impl Runner {
    fn run(&self) {
        let exec = self.exec.clone();
        let name = self.name.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            debug!("{}: running {:?}", name, exec);
            let result = match Command::new("sh").arg("-c").arg(&*exec).output().await {
                Ok(output) if output.status.success() => {
                    Ok(first_line(&String::from_utf8_lossy(&output.stdout)).to_string())
                }
                Ok(output) => Err(format!(
                    "{:?} exited with {}: {}",
                    exec,
                    output.status,
                    first_line(&String::from_utf8_lossy(&output.stderr))
                )),
                Err(e) => Err(format!("failed to run {:?}: {}", exec, e)),
            };
            let _ = tx.send(result).await;
        });
    }
}

/// Output of a shell command, rerun on an interval or on its signal
pub struct Custom {
    name: CompactString,
    label: ModuleLabel,
    format: String,
    signal: Option<i32>,
    runner: Runner,
    last: Rc<RefCell<Option<ExecResult>>>,
    timer: Option<glib::SourceId>,
}

impl Custom {
    pub fn new(
        name: &str,
        config: &Value,
        update: UpdateSignal,
        runtime: Handle,
    ) -> Result<Self, ModuleError> {
        let exec = format_string(config, "exec")
            .ok_or_else(|| ModuleError::invalid_config("missing exec"))?;
        let signal = match config.get("signal") {
            None => None,
            Some(value) => Some(
                value
                    .as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| ModuleError::invalid_config("signal must be an integer"))?,
            ),
        };

        let (tx, rx) = async_channel::bounded::<ExecResult>(8);
        let runner = Runner {
            name: name.into(),
            exec: Arc::from(exec),
            runtime,
            tx,
        };

        let last = Rc::new(RefCell::new(None));
        let results = last.clone();
        glib::spawn_future_local(async move {
            while let Ok(result) = rx.recv().await {
                *results.borrow_mut() = Some(result);
                update.emit();
            }
        });

        // Without an interval the command runs once, then on its signal
        let timer = config.get("interval").and_then(Value::as_u64).map(|secs| {
            let runner = runner.clone();
            glib::timeout_add_local(std::time::Duration::from_secs(secs.max(1)), move || {
                runner.run();
                ControlFlow::Continue
            })
        });
        runner.run();

        Ok(Self {
            name: name.into(),
            label: ModuleLabel::new(name, "custom"),
            format: format_string(config, "format").unwrap_or("{}").to_string(),
            signal,
            runner,
            last,
            timer,
        })
    }
}

impl Module for Custom {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self) -> Result<(), ModuleError> {
        let last = self.last.borrow();
        match last.as_ref() {
            None => Ok(()),
            Some(Ok(output)) => {
                self.label.set_error(false);
                self.label.set_text(&render_output(&self.format, output));
                Ok(())
            }
            Some(Err(e)) => {
                self.label.set_error(true);
                Err(ModuleError::update(e.clone()))
            }
        }
    }

    fn refresher(&mut self) -> Option<&mut dyn Refresh> {
        if self.signal.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl Refresh for Custom {
    fn refresh(&mut self, signal: i32) {
        if self.signal == Some(signal) {
            self.runner.run();
        }
    }
}

impl GtkModule for Custom {
    fn widget(&self) -> gtk4::Widget {
        self.label.widget()
    }
}

impl Drop for Custom {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.remove();
        }
    }
}

fn first_line(output: &str) -> &str {
    output.lines().next().unwrap_or("").trim_end()
}

/// Substitute the command output for `{}`; empty output hides the module
fn render_output(format: &str, output: &str) -> String {
    if output.is_empty() {
        return String::new();
    }
    format.replace("{}", output)
}
