use crate::domain::model::{NavigationSettings, SiteLayout};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// 片段來源：依位置字串取得片段原始標記
#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn base_location(&self) -> &str;
    fn components(&self) -> &BTreeMap<String, String>;
    fn layout(&self) -> &SiteLayout;
    fn navigation(&self) -> &NavigationSettings;
}
