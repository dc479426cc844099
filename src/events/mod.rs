mod dispatch;
mod hub;

pub use dispatch::{EventDispatcher, LogToastSink, ToastSink};
pub use hub::{EventHub, Listener, Subscription};
