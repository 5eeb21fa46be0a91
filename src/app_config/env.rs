use std::env;

use crate::sync::model::ShopConfig;

/// 读取环境变量，不存在时使用默认值
pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// 从JSON文件加载店铺配置（店铺名 -> 平台/店铺ID/凭证）。
/// 凭证只在这里进入进程，后续以只读方式传给编排器。
pub fn load_shops(path: &str) -> anyhow::Result<Vec<ShopConfig>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("读取店铺配置文件{}失败: {}", path, e))?;
    let shops: Vec<ShopConfig> = serde_json::from_str(&content)?;
    Ok(shops)
}
