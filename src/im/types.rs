use crate::im::error::RemoteError;
use serde::Deserialize;
use tracing::{debug, error};

/// 统一的 API 响应包装结构体（包含 success、data，失败时可能带 message）
/// data 字段可能为 null 或缺失，因此使用 Option<T>
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl<T> ApiResponse<T> {
    /// 取出 data，success=false 或 data 缺失都视为失败
    pub fn into_data(self) -> Result<T, RemoteError> {
        if !self.success {
            let reason = match self.message {
                Some(serde_json::Value::String(s)) if !s.is_empty() => s,
                _ => "success=false".to_string(),
            };
            return Err(RemoteError::Rejected(reason));
        }
        self.data
            .ok_or_else(|| RemoteError::Malformed("响应中缺少 data 字段".to_string()))
    }
}

/// 通用 HTTP 响应处理函数：检查状态码并反序列化为统一的响应结构体
pub async fn handle_http_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    operation_name: &str,
) -> Result<ApiResponse<T>, RemoteError> {
    let status = response.status();

    // 读取 body bytes（只能读取一次）
    let body_bytes = response.bytes().await?;
    let body_str = String::from_utf8_lossy(&body_bytes);

    if !status.is_success() {
        error!(
            "[HTTP] {}请求失败，HTTP状态: {}, 响应: {}",
            operation_name, status, body_str
        );
        return Err(RemoteError::Status {
            status: status.as_u16(),
            body: body_str.into_owned(),
        });
    }
    debug!("[HTTP] {}请求成功，HTTP状态: {}", operation_name, status);

    serde_json::from_slice::<ApiResponse<T>>(&body_bytes).map_err(|e| {
        error!(
            "[HTTP] {}反序列化失败: {:?}\n原始响应: {}",
            operation_name, e, body_str
        );
        RemoteError::Malformed(e.to_string())
    })
}
