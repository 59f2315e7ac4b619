//! Batched read calls through a deployed Multicall contract.
//!
//! # Data Flow
//! ```text
//! [CallDescriptor] → normalize targets (20-byte hash)
//!     → encode aggregate((address,bytes)[]) parameters
//!     → triggerconstantcontract (owner = contract = multicall)
//!     → decode (uint256 blockNumber, bytes[] returnData)
//!     → exactly one result per call
//! ```

use std::str::FromStr;

use alloy::primitives::U256;
use alloy::sol;
use alloy::sol_types::SolCall;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::codec::{abi, decode_hex, TronAddress};
use crate::config::schema::MulticallConfig;
use crate::rpc::api::{address_param, TriggerContractRequest};
use crate::rpc::RpcClient;

/// Signature of the batching function.
pub const AGGREGATE_SIGNATURE: &str = "aggregate((address,bytes)[])";

sol! {
    function balanceOf(address account) external view returns (uint256);
}

/// One logical call: a target contract (Base58Check or hex) and its call data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDescriptor {
    pub target: String,
    pub call_data: Vec<u8>,
}

impl CallDescriptor {
    pub fn new(target: impl Into<String>, call_data: impl Into<Vec<u8>>) -> Self {
        Self {
            target: target.into(),
            call_data: call_data.into(),
        }
    }
}

/// Client for a Multicall contract at a fixed address.
#[derive(Debug, Clone)]
pub struct Multicall {
    client: RpcClient,
    address: TronAddress,
}

impl Multicall {
    pub fn new(client: RpcClient, address: TronAddress) -> Self {
        Self { client, address }
    }

    /// Build from the `[multicall]` config section.
    pub fn from_config(client: RpcClient, config: &MulticallConfig) -> BlockchainResult<Self> {
        let text = config.address.as_deref().ok_or_else(|| {
            BlockchainError::ContractCall("multicall address not configured".into())
        })?;
        Ok(Self::new(client, TronAddress::from_str(text)?))
    }

    pub fn address(&self) -> TronAddress {
        self.address
    }

    /// Run all calls in one constant call and return their raw results in order.
    ///
    /// Fails without partial results if any target is invalid, the node
    /// rejects the call, or the number of results differs from `calls.len()`.
    pub async fn aggregate(&self, calls: &[CallDescriptor]) -> BlockchainResult<Vec<Vec<u8>>> {
        if calls.is_empty() {
            return Ok(Vec::new());
        }

        let mut targets = Vec::with_capacity(calls.len());
        for (index, call) in calls.iter().enumerate() {
            let target = TronAddress::from_str(&call.target)
                .map_err(|source| BlockchainError::Call { index, source })?;
            targets.push((target.evm_bytes(), call.call_data.as_slice()));
        }
        let parameter = hex::encode(abi::encode_call_array(&targets));

        let visible = self.client.visible();
        let multicall = address_param(&self.address, visible);
        let request = TriggerContractRequest {
            owner_address: multicall.clone(),
            contract_address: multicall,
            function: AGGREGATE_SIGNATURE.to_string(),
            parameter,
            visible,
            ..Default::default()
        };

        tracing::debug!(calls = calls.len(), multicall = %self.address, "Aggregating calls");

        let response = self
            .client
            .trigger_constant_contract(&request)
            .await
            .map_err(BlockchainError::from_rpc)?;

        let first = response.constant_result.first().ok_or_else(|| {
            BlockchainError::ContractCall(format!(
                "empty constant_result: {}",
                response.message.as_deref().unwrap_or("no message")
            ))
        })?;

        let results = decode_aggregate_output(&decode_hex(first)?)?;
        if results.len() != calls.len() {
            return Err(BlockchainError::ResultCountMismatch {
                expected: calls.len(),
                actual: results.len(),
            });
        }
        Ok(results)
    }

    /// `balanceOf` of each holder on one token, in holder order.
    pub async fn balance_of(
        &self,
        token: &TronAddress,
        holders: &[TronAddress],
    ) -> BlockchainResult<Vec<U256>> {
        let token = token.to_base58();
        let calls: Vec<CallDescriptor> = holders
            .iter()
            .map(|holder| {
                let data = balanceOfCall { account: holder.evm_address() }.abi_encode();
                CallDescriptor::new(token.clone(), data)
            })
            .collect();

        self.aggregate(&calls)
            .await?
            .iter()
            .enumerate()
            .map(|(index, result)| {
                abi::decode_uint256_return(result)
                    .map_err(|source| BlockchainError::Call { index, source })
            })
            .collect()
    }
}

/// Split `(uint256 blockNumber, bytes[] returnData)` and return `returnData`.
pub fn decode_aggregate_output(data: &[u8]) -> BlockchainResult<Vec<Vec<u8>>> {
    let offset = abi::read_usize(data, abi::WORD_LEN)?;
    Ok(abi::decode_bytes_array(data, offset)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::rpc::client::tests::{client_with, ok, ScriptedTransport};
    use alloy::primitives::Bytes;
    use alloy::sol_types::SolValue;
    use serde_json::json;

    const MULTICALL: &str = "THsJpDb3em1rLw9Fdkqp3Hu6GA6hrcAdhd";
    const TOKEN_HEX: &str = "410000000000000000000000000000000000000000";

    fn aggregate_output(results: Vec<Vec<u8>>) -> String {
        let encoded = (
            U256::from(1234u64),
            results.into_iter().map(Bytes::from).collect::<Vec<_>>(),
        )
            .abi_encode_params();
        hex::encode(encoded)
    }

    fn multicall(transport: std::sync::Arc<ScriptedTransport>) -> Multicall {
        Multicall::new(client_with(transport, 0), MULTICALL.parse().unwrap())
    }

    #[tokio::test]
    async fn test_empty_input_skips_network() {
        let transport = ScriptedTransport::new(Vec::new());
        let results = multicall(transport.clone()).aggregate(&[]).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_aggregate_request_and_results() {
        let transport = ScriptedTransport::new(vec![ok(json!({
            "result": {"result": true},
            "constant_result": [aggregate_output(vec![vec![1, 2], Vec::new()])]
        }))]);
        let calls = vec![
            CallDescriptor::new(MULTICALL, vec![0xaa]),
            CallDescriptor::new(TOKEN_HEX, Vec::new()),
        ];

        let results = multicall(transport.clone()).aggregate(&calls).await.unwrap();
        assert_eq!(results, vec![vec![1, 2], Vec::new()]);

        let body = transport.body(0);
        assert_eq!(transport.url(0), "http://node.test/wallet/triggerconstantcontract");
        assert_eq!(body["function_selector"], AGGREGATE_SIGNATURE);
        assert_eq!(body["owner_address"], body["contract_address"]);
        assert_eq!(body["owner_address"], "4156a35ceeb03d6866c3610f2e95f65d4c42c6c64f");

        let targets: Vec<([u8; 20], &[u8])> = vec![
            (MULTICALL.parse::<TronAddress>().unwrap().evm_bytes(), &[0xaa]),
            ([0u8; 20], &[]),
        ];
        assert_eq!(body["parameter"], hex::encode(abi::encode_call_array(&targets)));
    }

    #[tokio::test]
    async fn test_result_count_mismatch() {
        let transport = ScriptedTransport::new(vec![ok(json!({
            "constant_result": [aggregate_output(vec![vec![1], vec![2]])]
        }))]);
        let calls = vec![
            CallDescriptor::new(MULTICALL, vec![1]),
            CallDescriptor::new(MULTICALL, vec![2]),
            CallDescriptor::new(MULTICALL, vec![3]),
        ];

        let err = multicall(transport).aggregate(&calls).await.unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::ResultCountMismatch { expected: 3, actual: 2 }
        ));
    }

    #[tokio::test]
    async fn test_invalid_target_carries_index() {
        let transport = ScriptedTransport::new(Vec::new());
        let calls = vec![
            CallDescriptor::new(MULTICALL, vec![1]),
            CallDescriptor::new("THsJpDb3em1rLw9Fdkqp3Hu6GA6hrcAdhe", vec![2]),
        ];

        let err = multicall(transport.clone()).aggregate(&calls).await.unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::Call { index: 1, source: CodecError::InvalidChecksum }
        ));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_constant_result() {
        let transport = ScriptedTransport::new(vec![ok(json!({
            "result": {"result": false},
            "message": "REVERT opcode executed"
        }))]);
        let calls = vec![CallDescriptor::new(MULTICALL, vec![1])];
        let err = multicall(transport).aggregate(&calls).await.unwrap_err();
        assert!(matches!(err, BlockchainError::ContractCall(m) if m.contains("REVERT")));
    }

    #[tokio::test]
    async fn test_balance_of() {
        let word = |n: u64| U256::from(n).to_be_bytes::<32>().to_vec();
        let transport = ScriptedTransport::new(vec![ok(json!({
            "constant_result": [aggregate_output(vec![word(5), word(1_000_000)])]
        }))]);
        let holders: Vec<TronAddress> = vec![
            MULTICALL.parse().unwrap(),
            TOKEN_HEX.parse().unwrap(),
        ];
        let token: TronAddress = MULTICALL.parse().unwrap();

        let balances = multicall(transport.clone()).balance_of(&token, &holders).await.unwrap();
        assert_eq!(balances, vec![U256::from(5u64), U256::from(1_000_000u64)]);

        let first = balanceOfCall { account: holders[0].evm_address() }.abi_encode();
        let second = balanceOfCall { account: holders[1].evm_address() }.abi_encode();
        assert_eq!(&first[..4], &abi::function_selector("balanceOf(address)"));
        let targets: Vec<([u8; 20], &[u8])> = vec![
            (token.evm_bytes(), first.as_slice()),
            (token.evm_bytes(), second.as_slice()),
        ];
        assert_eq!(
            transport.body(0)["parameter"],
            hex::encode(abi::encode_call_array(&targets))
        );
    }

    #[tokio::test]
    async fn test_balance_of_rejects_short_results() {
        let token: TronAddress = MULTICALL.parse().unwrap();
        let holders: Vec<TronAddress> = vec![token, TOKEN_HEX.parse().unwrap()];

        let transport = ScriptedTransport::new(vec![ok(json!({
            "constant_result": [aggregate_output(vec![Vec::new(), vec![0x05]])]
        }))]);
        let err = multicall(transport).balance_of(&token, &holders).await.unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::Call { index: 0, source: CodecError::InvalidAbiData(_) }
        ));

        let word = U256::from(9u64).to_be_bytes::<32>().to_vec();
        let transport = ScriptedTransport::new(vec![ok(json!({
            "constant_result": [aggregate_output(vec![word, vec![0x05]])]
        }))]);
        let err = multicall(transport).balance_of(&token, &holders).await.unwrap_err();
        assert!(matches!(
            err,
            BlockchainError::Call { index: 1, source: CodecError::InvalidAbiData(_) }
        ));
    }
}
