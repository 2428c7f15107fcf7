//! Rate-limited, multi-provider model selection for asak.
//!
//! # Architecture
//!
//! - [`recorder::QuotaTracker`] — per-model rolling minute/day windows, with snapshot export and merge
//! - [`selector::Selector`] — validates a [`asak_core::Config`], picks a model by [`Mode`], dispatches requests
//! - [`filter::ModelFilter`] — textual form of the selection predicate
//! - [`delta::DeltaStream`] — text-only view of a streamed completion
//! - [`clock`] — time source, swappable in tests
//!
//! ```no_run
//! use asak_core::{config::load_config, Message};
//! use asak_router::{Mode, ResponseBody, Selector};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let selector = Selector::new(load_config(None)?)?;
//! let response = selector
//!     .request(Mode::Available, None, vec![Message::user("Hello")], false)
//!     .await?;
//! if let ResponseBody::Message { message, .. } = response.body {
//!     println!("{}: {}", response.selected.model, message.content.unwrap_or_default());
//! }
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod delta;
pub mod error;
pub mod filter;
pub mod recorder;
pub mod selector;

pub use clock::{Clock, ManualClock, SystemClock};
pub use delta::DeltaStream;
pub use error::{Result, RouterError};
pub use filter::ModelFilter;
pub use recorder::{parse_snapshot, QuotaTracker, UsageRecord, DAY_WINDOW_MS, MINUTE_WINDOW_MS};
pub use selector::{
    Mode, Predicate, Response, ResponseBody, SelectedModel, Selector, SelectorBuilder,
};
