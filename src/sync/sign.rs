use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

use crate::error::AppError;
use crate::sync::model::RequestParams;

/// 签名十六进制大小写，服务端按字节比较签名，必须与平台要求完全一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexCase {
    Lower,
    Upper,
}

/// 密钥包裹方式：聚水潭只做前缀，拼多多/淘宝前后都包
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretWrap {
    Prefix,
    Both,
}

/// 平台签名策略的封闭集合
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignAlgorithm {
    /// 键升序拼接key+value后MD5
    Md5Concat { wrap: SecretWrap, case: HexCase },
    /// 钉钉webhook签名：HMAC-SHA256("{timestamp}\n{secret}")，base64后再百分号编码
    HmacSha256,
}

/// 计算请求签名。纯函数：相同（参数，密钥）必得相同签名，
/// 时间戳作为参数传入，函数内部不读时钟。
/// 名为sign的参数和无值参数不参与拼接。
pub fn sign(params: &RequestParams, secret: &str, algorithm: SignAlgorithm) -> Result<String, AppError> {
    match algorithm {
        SignAlgorithm::Md5Concat { wrap, case } => {
            let mut base = String::new();
            for (key, value) in params.iter_present() {
                if key == "sign" {
                    continue;
                }
                base.push_str(key);
                base.push_str(value);
            }
            let wrapped = match wrap {
                SecretWrap::Prefix => format!("{}{}", secret, base),
                SecretWrap::Both => format!("{}{}{}", secret, base, secret),
            };
            let digest = Md5::digest(wrapped.as_bytes());
            let hexed = hex::encode(digest);
            Ok(match case {
                HexCase::Lower => hexed,
                HexCase::Upper => hexed.to_uppercase(),
            })
        }
        SignAlgorithm::HmacSha256 => {
            let timestamp = params
                .get("timestamp")
                .ok_or_else(|| AppError::Encoding("HmacSha256签名缺少timestamp参数".to_string()))?;
            let message = format!("{}\n{}", timestamp, secret);
            let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
                .map_err(|e| AppError::Encoding(e.to_string()))?;
            mac.update(message.as_bytes());
            let encoded = BASE64.encode(mac.finalize().into_bytes());
            Ok(urlencoding::encode(&encoded).into_owned())
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sync::model::RequestParams;

    #[test]
    fn test_md5_empty_is_known_vector() {
        // MD5("")，空参数集+空密钥
        let sig = sign(
            &RequestParams::new(),
            "",
            SignAlgorithm::Md5Concat {
                wrap: SecretWrap::Prefix,
                case: HexCase::Lower,
            },
        )
        .unwrap();
        assert_eq!(sig, "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_upper_case_output() {
        let params = RequestParams::new().with("app_key", "abc").with("timestamp", "1");
        let sig = sign(
            &params,
            "secret",
            SignAlgorithm::Md5Concat {
                wrap: SecretWrap::Both,
                case: HexCase::Upper,
            },
        )
        .unwrap();
        assert_eq!(sig.len(), 32);
        assert_eq!(sig, sig.to_uppercase());
    }
}
