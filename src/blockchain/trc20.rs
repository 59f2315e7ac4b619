//! TRC20 token reads and transfer building.

use alloy::primitives::U256;
use serde_json::Value;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::codec::{abi, decode_hex, CodecError, TronAddress};
use crate::rpc::api::{address_param, ConstantCallResult, TriggerContractRequest};
use crate::rpc::RpcClient;

/// Caller used for reads that take no owner. Any well-formed address works;
/// nodes only require one to be present.
pub const DEFAULT_READ_OWNER: &str = "TTyNBH7UDfxY1wqyjq9CsTgYM9p5KnNB3b";
const DEFAULT_READ_OWNER_HEX: &str = "41c579ec8c2f2ad371d1c8fb238715a5d536bbe8ce";

/// A TRC20 token contract.
#[derive(Debug, Clone)]
pub struct Trc20 {
    client: RpcClient,
    contract: TronAddress,
    read_owner: Option<TronAddress>,
}

impl Trc20 {
    pub fn new(client: RpcClient, contract: TronAddress) -> Self {
        Self {
            client,
            contract,
            read_owner: None,
        }
    }

    /// Use `owner` as the caller for owner-less reads.
    pub fn with_read_owner(mut self, owner: TronAddress) -> Self {
        self.read_owner = Some(owner);
        self
    }

    pub fn contract(&self) -> TronAddress {
        self.contract
    }

    /// Token balance of `owner`.
    pub async fn balance_of(&self, owner: &TronAddress) -> BlockchainResult<U256> {
        let parameter = abi::encode_address_word(owner);
        let raw = self
            .constant_call("balanceOf(address)", self.address(owner), parameter)
            .await?;
        Ok(abi::decode_uint256_return(&decode_hex(&raw)?)?)
    }

    pub async fn decimals(&self) -> BlockchainResult<u8> {
        let value = self.call_uint256("decimals()").await?;
        if value > U256::from(u8::MAX) {
            return Err(BlockchainError::Codec(CodecError::Overflow));
        }
        Ok(value.as_limbs()[0] as u8)
    }

    pub async fn total_supply(&self) -> BlockchainResult<U256> {
        self.call_uint256("totalSupply()").await
    }

    pub async fn name(&self) -> BlockchainResult<String> {
        self.call_string("name()").await
    }

    pub async fn symbol(&self) -> BlockchainResult<String> {
        self.call_string("symbol()").await
    }

    /// Build an unsigned `transfer(address,uint256)` transaction from `from`.
    ///
    /// The returned JSON is the node's transaction object, ready for
    /// [`Wallet::sign_json`](crate::blockchain::Wallet::sign_json).
    pub async fn build_transfer(
        &self,
        from: &TronAddress,
        to: &TronAddress,
        amount: U256,
        fee_limit: i64,
    ) -> BlockchainResult<Value> {
        let parameter = abi::concat([
            abi::encode_address_word(to),
            abi::encode_uint256(amount),
        ])?;
        let request = TriggerContractRequest {
            owner_address: self.address(from),
            contract_address: self.address(&self.contract),
            function: "transfer(address,uint256)".into(),
            parameter,
            fee_limit,
            visible: self.client.visible(),
            ..Default::default()
        };

        let response = self
            .client
            .trigger_smart_contract(&request)
            .await
            .map_err(BlockchainError::from_rpc)?;

        if !response.result.result {
            return Err(rejected(response.message, "triggersmartcontract failed"));
        }
        match response.transaction {
            Some(tx) if tx.is_object() => Ok(tx),
            _ => Err(BlockchainError::Decode("empty transaction".into())),
        }
    }

    async fn call_uint256(&self, function: &str) -> BlockchainResult<U256> {
        let raw = self
            .constant_call(function, self.read_owner(), String::new())
            .await?;
        Ok(abi::decode_uint256_return(&decode_hex(&raw)?)?)
    }

    async fn call_string(&self, function: &str) -> BlockchainResult<String> {
        let raw = self
            .constant_call(function, self.read_owner(), String::new())
            .await?;
        let (text, encoding) = abi::decode_string_best_effort(&decode_hex(&raw)?)?;
        tracing::debug!(
            contract = %self.contract,
            function = function,
            encoding = ?encoding,
            "Decoded string result"
        );
        Ok(text)
    }

    /// Run a constant call and return the first `constant_result` hex.
    async fn constant_call(
        &self,
        function: &str,
        owner: String,
        parameter: String,
    ) -> BlockchainResult<String> {
        let request = TriggerContractRequest {
            owner_address: owner,
            contract_address: self.address(&self.contract),
            function: function.to_string(),
            parameter,
            visible: self.client.visible(),
            ..Default::default()
        };

        let ConstantCallResult {
            result,
            constant_result,
            message,
        } = self
            .client
            .trigger_constant_contract(&request)
            .await
            .map_err(BlockchainError::from_rpc)?;

        if !result.result {
            return Err(rejected(message, "constant call failed"));
        }
        constant_result
            .into_iter()
            .next()
            .ok_or_else(|| BlockchainError::ContractCall("empty constant_result".into()))
    }

    fn address(&self, address: &TronAddress) -> String {
        address_param(address, self.client.visible())
    }

    fn read_owner(&self) -> String {
        match (&self.read_owner, self.client.visible()) {
            (Some(owner), visible) => address_param(owner, visible),
            (None, true) => DEFAULT_READ_OWNER.to_string(),
            (None, false) => DEFAULT_READ_OWNER_HEX.to_string(),
        }
    }
}

fn rejected(message: Option<String>, fallback: &str) -> BlockchainError {
    match message {
        Some(m) if !m.is_empty() => BlockchainError::ContractCall(m),
        _ => BlockchainError::ContractCall(fallback.to_string()),
    }
}
