mod hub;
mod ipc;
mod style_watcher;

pub use hub::ServiceHub;
pub use ipc::IpcServer;
pub use style_watcher::StyleWatcher;
