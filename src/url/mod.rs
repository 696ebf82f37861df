//! URL handling module for Lexicrawl
//!
//! Link canonicalization, site scoping by base-URL prefix, relative page
//! paths and filtering of non-HTML resources.

mod matcher;
mod normalize;

pub use matcher::{is_within_site, ScopedSite, SiteScope};
pub use normalize::{
    absolute_address, canonical_base, is_excluded_resource, normalize_link, relative_path,
};
