mod compositor;
mod decoder;
mod generator;
mod mapping;
pub mod vlq;

pub use compositor::ModuleCompositor;
pub use decoder::{DecodedMapping, DecodedSourceMap, SourceMapDecoder};
pub use generator::{SourceMapGenerator, SourceMapJson};
pub use mapping::{CodeGenFragment, MappingCollector, MappingItem, OriginalLocation};
