//! Typed wrappers over individual node API methods.
//!
//! Each wrapper is a direct request/response mapping over [`RpcClient::call`];
//! retry and error classification come from the client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::TronAddress;
use crate::rpc::client::RpcClient;
use crate::rpc::RpcResult;

/// Untyped JSON response.
pub type Raw = Value;

/// `getblockbynum` request.
#[derive(Debug, Clone, Serialize)]
pub struct BlockByNumRequest {
    pub num: i64,
}

/// Request keyed by a single hex `value` (block id, transaction id).
#[derive(Debug, Clone, Serialize)]
pub struct ValueRequest<'a> {
    pub value: &'a str,
}

/// `getaccount` request.
#[derive(Debug, Clone, Serialize)]
pub struct AccountRequest<'a> {
    pub address: &'a str,
    #[serde(skip_serializing_if = "is_false")]
    pub visible: bool,
}

/// `triggerconstantcontract` / `triggersmartcontract` request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TriggerContractRequest {
    pub owner_address: String,
    pub contract_address: String,
    #[serde(rename = "function_selector")]
    pub function: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parameter: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub call_value: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub fee_limit: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub visible: bool,
}

/// `createtransaction` request (native TRX transfer).
#[derive(Debug, Clone, Serialize)]
pub struct CreateTransactionRequest {
    pub owner_address: String,
    pub to_address: String,
    pub amount: i64,
    #[serde(skip_serializing_if = "is_false")]
    pub visible: bool,
}

/// Flag block shared by contract call responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultFlag {
    #[serde(default)]
    pub result: bool,
}

/// `triggerconstantcontract` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstantCallResult {
    #[serde(default)]
    pub result: ResultFlag,
    #[serde(default)]
    pub constant_result: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `triggersmartcontract` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmartCallResult {
    #[serde(default)]
    pub result: ResultFlag,
    #[serde(default)]
    pub transaction: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `broadcasttransaction` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BroadcastResponse {
    #[serde(default)]
    pub result: bool,
    #[serde(default, rename = "txid")]
    pub tx_id: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AccountBalance {
    #[serde(default)]
    balance: i64,
}

/// Address text in the form the node expects for the given `visible` flag.
pub fn address_param(address: &TronAddress, visible: bool) -> String {
    if visible {
        address.to_base58()
    } else {
        address.to_hex()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl RpcClient {
    /// Latest block.
    pub async fn get_now_block(&self) -> RpcResult<Raw> {
        self.call_empty("getnowblock").await
    }

    /// Block by height.
    pub async fn get_block_by_num(&self, num: i64) -> RpcResult<Raw> {
        self.call("getblockbynum", &BlockByNumRequest { num }).await
    }

    /// Block by id.
    pub async fn get_block_by_id(&self, block_id: &str) -> RpcResult<Raw> {
        self.call("getblockbyid", &ValueRequest { value: block_id }).await
    }

    /// Transaction by id.
    pub async fn get_transaction_by_id(&self, tx_id: &str) -> RpcResult<Raw> {
        self.call("gettransactionbyid", &ValueRequest { value: tx_id }).await
    }

    /// Execution info (block number, receipt) by transaction id.
    pub async fn get_transaction_info_by_id(&self, tx_id: &str) -> RpcResult<Raw> {
        self.call("gettransactioninfobyid", &ValueRequest { value: tx_id })
            .await
    }

    /// Account state.
    pub async fn get_account(&self, address: &str) -> RpcResult<Raw> {
        self.call(
            "getaccount",
            &AccountRequest {
                address,
                visible: self.visible(),
            },
        )
        .await
    }

    /// Native TRX balance in sun. Accounts the node has never seen report 0.
    pub async fn balance_at(&self, address: &str) -> RpcResult<i64> {
        let account: AccountBalance = self
            .call(
                "getaccount",
                &AccountRequest {
                    address,
                    visible: self.visible(),
                },
            )
            .await?;
        Ok(account.balance)
    }

    /// Read-only contract call.
    pub async fn trigger_constant_contract(
        &self,
        request: &TriggerContractRequest,
    ) -> RpcResult<ConstantCallResult> {
        self.call("triggerconstantcontract", request).await
    }

    /// Build an unsigned state-changing contract call.
    pub async fn trigger_smart_contract(
        &self,
        request: &TriggerContractRequest,
    ) -> RpcResult<SmartCallResult> {
        self.call("triggersmartcontract", request).await
    }

    /// Build an unsigned TRX transfer.
    pub async fn create_transaction(&self, request: &CreateTransactionRequest) -> RpcResult<Raw> {
        self.call("createtransaction", request).await
    }

    /// Build an unsigned transfer of `amount` sun from `from` to `to`, with
    /// addresses in the form the client's `visible` setting selects.
    pub async fn build_transfer_trx(
        &self,
        from: &TronAddress,
        to: &TronAddress,
        amount: i64,
    ) -> RpcResult<Raw> {
        let visible = self.visible();
        self.create_transaction(&CreateTransactionRequest {
            owner_address: address_param(from, visible),
            to_address: address_param(to, visible),
            amount,
            visible,
        })
        .await
    }

    /// Node information.
    pub async fn get_node_info(&self) -> RpcResult<Raw> {
        self.call_empty("getnodeinfo").await
    }

    /// Submit a signed transaction envelope.
    pub async fn broadcast_transaction(&self, signed: &Value) -> RpcResult<BroadcastResponse> {
        self.call("broadcasttransaction", signed).await
    }
}
