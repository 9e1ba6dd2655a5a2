use lazy_static::lazy_static;
use marker_catalog::CatalogSet;

pub mod about;
pub mod app;
pub mod artifact;
pub mod catalog_sync;
pub mod error;
pub mod export;
pub mod marker_catalog;
pub mod marker_name;
pub mod metadata;
pub mod panel;
pub mod session;

lazy_static! {
    // Chemistry catalogs: builtin, with runtime overrides from
    // data/resources where synced copies exist.
    pub static ref CATALOGS: CatalogSet = CatalogSet::default();
}
