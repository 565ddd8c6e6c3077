//! JSON-RPC client for Starknet nodes
//!
//! Provides a typed interface to the three node queries the scanner needs.
//! Every failure (transport, timeout, status, RPC error, shape) surfaces as
//! a `NetworkError`; retry policy belongs to the caller.

use crate::error::NetworkError;
use crate::types::{BlockHandle, BlockWithTxs, LatestBlock, Receipt, Transaction};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const METHOD_LATEST_BLOCK: &str = "starknet_blockHashAndNumber";
pub const METHOD_BLOCK_WITH_TXS: &str = "starknet_getBlockWithTxs";
pub const METHOD_RECEIPT: &str = "starknet_getTransactionReceipt";

/// Node queries used by the block scanner and poll loop.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current head of the chain.
    async fn latest_block(&self) -> Result<LatestBlock, NetworkError>;

    /// All transactions in the given block. An empty list is a valid answer.
    async fn block_transactions(
        &self,
        block: &BlockHandle,
    ) -> Result<Vec<Transaction>, NetworkError>;

    /// Receipt (with events) of one transaction.
    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Receipt, NetworkError>;
}

/// JSON-RPC client for a Starknet node.
pub struct StarknetRpc {
    client: reqwest::Client,
    url: String,
}

impl StarknetRpc {
    /// Create a new RPC client with a per-request timeout.
    pub fn new(url: String, timeout: Duration) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::from_reqwest("client", e))?;
        Ok(Self { client, url })
    }

    /// Make a JSON-RPC call and deserialize its `result`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<T, NetworkError> {
        debug!("Sending {} → {}", method, self.url);

        // reqwest sets Content-Type: application/json for .json()
        let response = self
            .client
            .post(&self.url)
            .json(&request_body(method, params))
            .send()
            .await
            .map_err(|e| NetworkError::from_reqwest(method, e))?;

        check_status(method, response.status())?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| NetworkError::from_reqwest(method, e))?;

        extract_result(method, body)
    }
}

/// JSON-RPC 2.0 envelope. The node is always addressed with `id: 0`.
fn request_body(method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 0
    })
}

fn block_params(block: &BlockHandle) -> Value {
    json!([{ "block_hash": block.as_str() }])
}

fn receipt_params(tx_hash: &str) -> Value {
    json!([tx_hash])
}

/// Anything but 200 is a failed call, whatever the body says.
fn check_status(method: &'static str, status: StatusCode) -> Result<(), NetworkError> {
    if status != StatusCode::OK {
        return Err(NetworkError::Status {
            method,
            status: status.as_u16(),
        });
    }
    Ok(())
}

/// Pull `result` out of a JSON-RPC response body.
fn extract_result<T: DeserializeOwned>(
    method: &'static str,
    mut body: Value,
) -> Result<T, NetworkError> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        return Err(NetworkError::Rpc {
            method,
            message: error.to_string(),
        });
    }

    let result = match body.get_mut("result") {
        Some(result) if !result.is_null() => result.take(),
        _ => return Err(NetworkError::malformed(method, "missing 'result' field")),
    };

    serde_json::from_value(result).map_err(|e| NetworkError::malformed(method, e.to_string()))
}

#[async_trait]
impl ChainClient for StarknetRpc {
    async fn latest_block(&self) -> Result<LatestBlock, NetworkError> {
        self.call(METHOD_LATEST_BLOCK, json!([])).await
    }

    async fn block_transactions(
        &self,
        block: &BlockHandle,
    ) -> Result<Vec<Transaction>, NetworkError> {
        let block: BlockWithTxs = self.call(METHOD_BLOCK_WITH_TXS, block_params(block)).await?;
        Ok(block.transactions)
    }

    async fn transaction_receipt(&self, tx_hash: &str) -> Result<Receipt, NetworkError> {
        self.call(METHOD_RECEIPT, receipt_params(tx_hash)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Read one HTTP request and return its body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .map(|(_, value)| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break;
                }
            }
        }

        let text = String::from_utf8(buf).unwrap();
        text.split_once("\r\n\r\n")
            .map(|(_, body)| body.to_string())
            .unwrap_or_default()
    }

    /// Answer a single request with `status` and `body`; the handle yields
    /// the request body that was received.
    async fn serve_once(status: &'static str, body: Value) -> (String, JoinHandle<Value>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let body = body.to_string();
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            serde_json::from_str(&request).unwrap()
        });

        (url, handle)
    }

    fn client(url: String) -> StarknetRpc {
        StarknetRpc::new(url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_body_envelope() {
        let body = request_body(METHOD_LATEST_BLOCK, json!([]));
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "starknet_blockHashAndNumber",
                "params": [],
                "id": 0
            })
        );
    }

    #[test]
    fn test_param_shapes() {
        assert_eq!(
            block_params(&BlockHandle::from("0xb1")),
            json!([{ "block_hash": "0xb1" }])
        );
        assert_eq!(receipt_params("0x77"), json!(["0x77"]));
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(METHOD_RECEIPT, StatusCode::OK).is_ok());

        let err = check_status(METHOD_RECEIPT, StatusCode::BAD_GATEWAY).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Status {
                method: METHOD_RECEIPT,
                status: 502
            }
        ));
    }

    #[tokio::test]
    async fn test_latest_block_request() {
        let reply = json!({ "jsonrpc": "2.0", "id": 0, "result": { "block_hash": "0x5" } });
        let (url, request) = serve_once("200 OK", reply).await;

        let latest = client(url).latest_block().await.unwrap();
        assert_eq!(latest.block_hash, BlockHandle::from("0x5"));
        assert_eq!(latest.block_number, None);

        assert_eq!(
            request.await.unwrap(),
            request_body(METHOD_LATEST_BLOCK, json!([]))
        );
    }

    #[tokio::test]
    async fn test_block_transactions_request() {
        let reply = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "result": { "transactions": [{ "transaction_hash": "0xaa", "calldata": ["0x1"] }] }
        });
        let (url, request) = serve_once("200 OK", reply).await;

        let txs = client(url)
            .block_transactions(&BlockHandle::from("0xb1"))
            .await
            .unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].hash, "0xaa");

        let sent = request.await.unwrap();
        assert_eq!(sent["method"], METHOD_BLOCK_WITH_TXS);
        assert_eq!(sent["params"], json!([{ "block_hash": "0xb1" }]));
        assert_eq!(sent["id"], 0);
    }

    #[tokio::test]
    async fn test_receipt_request() {
        let reply = json!({ "jsonrpc": "2.0", "id": 0, "result": { "events": [] } });
        let (url, request) = serve_once("200 OK", reply).await;

        let receipt = client(url).transaction_receipt("0x77").await.unwrap();
        assert!(receipt.events.is_empty());

        let sent = request.await.unwrap();
        assert_eq!(sent["method"], METHOD_RECEIPT);
        assert_eq!(sent["params"], json!(["0x77"]));
    }

    #[tokio::test]
    async fn test_non_200_is_status_error() {
        // a well-formed result does not rescue a bad status
        let reply = json!({ "jsonrpc": "2.0", "id": 0, "result": { "block_hash": "0x5" } });
        let (url, _request) = serve_once("503 Service Unavailable", reply).await;

        let err = client(url).latest_block().await.unwrap_err();
        assert!(matches!(err, NetworkError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_stalled_node_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let rpc = StarknetRpc::new(url, Duration::from_millis(200)).unwrap();
        let err = rpc.latest_block().await.unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Timeout {
                method: METHOD_LATEST_BLOCK
            }
        ));
    }

    #[test]
    fn test_extract_result() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "result": { "block_hash": "0x5", "block_number": 7 }
        });
        let latest: LatestBlock = extract_result(METHOD_LATEST_BLOCK, body).unwrap();
        assert_eq!(latest.block_hash.as_str(), "0x5");
        assert_eq!(latest.block_number, Some(7));
    }

    #[test]
    fn test_extract_result_hash_only() {
        let body = json!({ "jsonrpc": "2.0", "id": 0, "result": { "block_hash": "0x5" } });
        let latest: LatestBlock = extract_result(METHOD_LATEST_BLOCK, body).unwrap();
        assert_eq!(latest.block_hash, BlockHandle::from("0x5"));
        assert_eq!(latest.block_number, None);

        let body = json!({ "jsonrpc": "2.0", "id": 0, "result": { "block_number": 7 } });
        let err = extract_result::<LatestBlock>(METHOD_LATEST_BLOCK, body).unwrap_err();
        assert!(matches!(err, NetworkError::Malformed { .. }));
    }

    #[test]
    fn test_extract_result_rpc_error() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "error": { "code": 24, "message": "Block not found" }
        });
        let err = extract_result::<LatestBlock>(METHOD_LATEST_BLOCK, body).unwrap_err();
        assert!(matches!(err, NetworkError::Rpc { .. }));
        assert!(err.to_string().contains("Block not found"));
    }

    #[test]
    fn test_extract_result_missing_field() {
        let body = json!({ "jsonrpc": "2.0", "id": 0 });
        let err = extract_result::<Receipt>(METHOD_RECEIPT, body).unwrap_err();
        assert!(matches!(err, NetworkError::Malformed { .. }));

        let body = json!({ "jsonrpc": "2.0", "id": 0, "result": null });
        let err = extract_result::<Receipt>(METHOD_RECEIPT, body).unwrap_err();
        assert!(matches!(err, NetworkError::Malformed { .. }));
    }

    #[test]
    fn test_extract_result_wrong_shape() {
        // block_hash present but block_number is not a number
        let body = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "result": { "block_hash": "0x5", "block_number": "seven" }
        });
        let err = extract_result::<LatestBlock>(METHOD_LATEST_BLOCK, body).unwrap_err();
        assert!(matches!(err, NetworkError::Malformed { .. }));
    }

    #[test]
    fn test_block_transactions_shape() {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 0,
            "result": { "transactions": [] }
        });
        let block: BlockWithTxs = extract_result(METHOD_BLOCK_WITH_TXS, body).unwrap();
        assert!(block.transactions.is_empty());
    }
}
