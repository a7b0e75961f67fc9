mod exports;
pub use exports::*;
mod inner_scopes;
pub use inner_scopes::*;
mod link_imports;
pub use link_imports::*;
mod root_rename;
pub use root_rename::*;
