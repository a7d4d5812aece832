pub mod chromosome;
pub mod item;
pub mod payload;
pub mod version;

// re-export for cleaner imports
pub use self::chromosome::Chromosome;
pub use self::item::AnnotationItem;
pub use self::payload::{
    AlleleFrequency, AncestralAllele, CustomAnnotation, GlobalMinorAllele, JsonRender, Payload,
    PayloadFamily,
};
pub use self::version::DataSourceVersion;
