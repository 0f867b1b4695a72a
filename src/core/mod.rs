pub mod behaviors;
pub mod composer;
pub mod contact;
pub mod page;
pub mod registry;
pub mod template;

pub use crate::domain::model::{PageIdentity, PropertyMap, Section, SiteLayout};
pub use crate::domain::ports::{ConfigProvider, FragmentSource};
pub use crate::utils::error::Result;
