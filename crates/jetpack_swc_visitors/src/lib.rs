mod scan;
pub use scan::*;
mod scope;
pub use scope::*;
mod rename;
pub use rename::*;
mod lower;
pub use lower::*;
mod resolve;
pub use resolve::*;
mod jsx;
pub use jsx::*;
