use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::error::AppError;
use crate::sync::model::{CanonicalOrderLine, Credential, RequestParams};
use crate::sync::normalize::coerce_list;
use crate::sync::sign::{sign, HexCase, SecretWrap, SignAlgorithm};
use crate::sync::transport::{PageRequest, PageTransport};
use crate::time_util;

/// 类目查不到时写入的占位名
pub const UNKNOWN_CATEGORY: &str = "未知类目";

/// 批量类目查询的来源，按去重后的CID集合一次取回
#[async_trait]
pub trait CategorySource: Send + Sync {
    async fn fetch_names(&self, cids: &[i64]) -> Result<HashMap<i64, String>, AppError>;
}

/// 单次运行内的类目缓存：同一个CID只查一次，
/// 查询失败或查不到都不阻塞订单行的产出。
pub struct CategoryResolver<'a> {
    source: &'a dyn CategorySource,
    cache: HashMap<i64, String>,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(source: &'a dyn CategorySource) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    /// 回填一批订单行的类目名
    pub async fn fill(&mut self, lines: &mut [CanonicalOrderLine]) {
        let missing: HashSet<i64> = lines
            .iter()
            .filter_map(|line| line.cid)
            .filter(|cid| !self.cache.contains_key(cid))
            .collect();

        if !missing.is_empty() {
            let cids: Vec<i64> = missing.into_iter().collect();
            match self.source.fetch_names(&cids).await {
                Ok(names) => {
                    // 查询成功但没返回的CID也记入缓存，后续批次不再重查
                    for cid in &cids {
                        let name = names.get(cid).cloned().unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
                        self.cache.insert(*cid, name);
                    }
                }
                Err(e) => warn!("批量查询类目失败，未解析的CID使用占位名: {}", e),
            }
        }

        for line in lines.iter_mut() {
            if let Some(cid) = line.cid {
                line.category = self
                    .cache
                    .get(&cid)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string());
            }
        }
    }
}

/// 淘宝taobao.itemcats.get类目查询
pub struct TaobaoCategorySource<'a> {
    transport: &'a dyn PageTransport,
    credential: Credential,
    endpoint: String,
}

impl<'a> TaobaoCategorySource<'a> {
    pub fn new(transport: &'a dyn PageTransport, credential: Credential, endpoint: String) -> Self {
        Self {
            transport,
            credential,
            endpoint,
        }
    }
}

#[async_trait]
impl<'a> CategorySource for TaobaoCategorySource<'a> {
    async fn fetch_names(&self, cids: &[i64]) -> Result<HashMap<i64, String>, AppError> {
        if cids.is_empty() {
            return Ok(HashMap::new());
        }

        let timestamp_str = time_util::format_datetime(&time_util::now_shanghai());
        let cid_list = cids
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let params = RequestParams::new()
            .with("method", "taobao.itemcats.get")
            .with("app_key", self.credential.app_key.clone())
            .with("session", self.credential.access_token.clone())
            .with("timestamp", timestamp_str)
            .with("v", "2.0")
            .with("sign_method", "md5")
            .with("format", "json")
            .with("cids", cid_list)
            .with("fields", "cid,name,status");
        let signature = sign(
            &params,
            &self.credential.app_secret,
            SignAlgorithm::Md5Concat {
                wrap: SecretWrap::Both,
                case: HexCase::Upper,
            },
        )?;

        let mut fields = params.to_form();
        fields.push(("sign".to_string(), signature));
        let body = self
            .transport
            .send(&PageRequest::Form {
                url: self.endpoint.clone(),
                fields,
            })
            .await?;

        let value: Value = serde_json::from_str(&body)?;
        if let Some(err) = value.get("error_response") {
            let msg = err.get("msg").and_then(Value::as_str).unwrap_or("未知错误");
            return Err(AppError::PlatformBusiness(format!("淘宝类目查询: {}", msg)));
        }

        let cats = coerce_list(&value["itemcats_get_response"]["item_cats"]["item_cat"]);
        let mut names = HashMap::new();
        for cat in &cats {
            let status = cat.get("status").and_then(Value::as_str).unwrap_or("");
            if status != "normal" {
                continue;
            }
            if let (Some(cid), Some(name)) = (
                cat.get("cid").and_then(Value::as_i64),
                cat.get("name").and_then(Value::as_str),
            ) {
                names.insert(cid, name.to_string());
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedSource {
        calls: AtomicU32,
    }

    #[async_trait]
    impl CategorySource for FixedSource {
        async fn fetch_names(&self, cids: &[i64]) -> Result<HashMap<i64, String>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(cids
                .iter()
                .filter(|&&cid| cid == 1)
                .map(|&cid| (cid, "女装".to_string()))
                .collect())
        }
    }

    fn line(cid: Option<i64>) -> CanonicalOrderLine {
        CanonicalOrderLine {
            cid,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fill_uses_cache_and_sentinel() {
        let source = FixedSource {
            calls: AtomicU32::new(0),
        };
        let mut resolver = CategoryResolver::new(&source);

        let mut lines = vec![line(Some(1)), line(Some(2)), line(None)];
        resolver.fill(&mut lines).await;
        assert_eq!(lines[0].category, "女装");
        // 查不到的CID用占位名，没有CID的行不动
        assert_eq!(lines[1].category, UNKNOWN_CATEGORY);
        assert_eq!(lines[2].category, "");

        // 同一批CID第二次回填不再发请求
        let mut more = vec![line(Some(1)), line(Some(2))];
        resolver.fill(&mut more).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
