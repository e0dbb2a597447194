#![warn(clippy::all, rust_2018_idioms)]

pub mod classify;
pub mod comm;
pub mod config;
mod contour;
pub mod func;
mod nr;
pub mod output;
mod partition;
mod scan;
mod search;
mod store;
mod tracer;

pub use classify::{Bounds, Classifier, Grid, PixelResult};
pub use comm::{Communicator, LocalCommunicator, SingleCommunicator, Span};
pub use config::{ClassifyConfig, Config, FallbackPolicy, SearchConfig};
pub use contour::{Counter, Region, Winding};
pub use func::Func;
pub use nr::Refiner;
pub use partition::{partition, WorkRange};
pub use scan::GridScanner;
pub use search::find_roots;
pub use store::{AddOutcome, RootStore, Roots};
pub use tracer::{TraceStats, Tracer};
