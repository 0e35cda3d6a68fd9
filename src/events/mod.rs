//! # Events Module
//!
//! Event-driven progress reporting for any UI layer.
//!
//! ## Design
//! The session controller publishes events through a broadcaster, allowing
//! any number of UIs (CLI, GUI, web) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let receiver = controller.subscribe();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Progress(p) = event {
//!             println!("{}% - {}", p.overall_percent, p.message);
//!         }
//!     }
//! });
//!
//! let session = controller.start_session(config)?;
//! ```

mod channel;
mod types;

pub use channel::{EventBroadcaster, EventChannel, EventReceiver, EventSender};
pub use types::*;
