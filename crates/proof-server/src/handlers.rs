//! HTTP request handlers.
//!
//! Every handler is stateless apart from the shared configuration: callers
//! supply the deposit events they fetched, nothing is cached server-side.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use mixer_notes::{
    fr_from_hex, fr_to_hex, ordered_commitments, Address, DepositEvent, EncodingError, EventError,
    MerkleError, MerkleProof, MerkleTree, NoteError, PoseidonCompression,
};
use mixer_prover::{build_inputs, FlowContext, GateError, WithdrawError, WithdrawalRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Withdraw(#[from] WithdrawError),
    #[error(transparent)]
    Note(#[from] NoteError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Events(#[from] EventError),
    #[error(transparent)]
    Merkle(#[from] MerkleError),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        debug!(error = %self, "request rejected");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ============ Deposit ============

#[derive(Deserialize)]
pub struct CreateDepositRequest {
    pub currency: String,
    pub amount: String,
    pub network_id: u64,
}

#[derive(Serialize)]
pub struct CreateDepositResponse {
    pub note: String,
    pub commitment: String,
    pub nullifier_hash: String,
    /// Deposit value in base units, decimal
    pub value: String,
}

pub async fn create_deposit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDepositRequest>,
) -> ApiResult<CreateDepositResponse> {
    let ctx = FlowContext::new(&state.config, req.network_id, &req.currency, &req.amount)?;
    let mut rng = rand::thread_rng();
    let ticket = mixer_prover::create_deposit(&ctx, &state.codec, &mut rng)?;

    Ok(Json(CreateDepositResponse {
        nullifier_hash: ticket.deposit.nullifier_hash_hex(),
        commitment: ticket.commitment,
        note: ticket.note,
        value: ticket.value.to_string(),
    }))
}

// ============ Note ============

#[derive(Deserialize)]
pub struct ParseNoteRequest {
    pub note: String,
}

#[derive(Serialize)]
pub struct ParseNoteResponse {
    pub currency: String,
    pub amount: String,
    pub network_id: u64,
    pub commitment: String,
    pub nullifier_hash: String,
}

pub async fn parse_note(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ParseNoteRequest>,
) -> ApiResult<ParseNoteResponse> {
    let note = state.codec.decode(req.note.trim())?;

    Ok(Json(ParseNoteResponse {
        commitment: note.deposit.commitment_hex(),
        nullifier_hash: note.deposit.nullifier_hash_hex(),
        currency: note.currency,
        amount: note.amount,
        network_id: note.network_id,
    }))
}

// ============ Merkle ============

/// Rebuild the tree from `events` and locate `commitment`.
fn locate(
    height: usize,
    events: &[DepositEvent],
    commitment: &ark_bn254::Fr,
) -> Result<(usize, MerkleProof), ApiError> {
    let leaves = ordered_commitments(events)?;
    let tree = MerkleTree::build(height, leaves, PoseidonCompression)?;
    let index = tree
        .find_leaf_index(commitment)
        .ok_or(GateError::LeafNotFound)?;
    Ok((index, tree.path(index)?))
}

#[derive(Deserialize)]
pub struct MerklePathRequest {
    pub events: Vec<DepositEvent>,
    pub commitment: String,
}

#[derive(Serialize)]
pub struct MerklePathResponse {
    pub root: String,
    pub leaf_index: usize,
    pub path_elements: Vec<String>,
    pub path_indices: Vec<u8>,
}

pub async fn merkle_path(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MerklePathRequest>,
) -> ApiResult<MerklePathResponse> {
    let commitment = fr_from_hex(&req.commitment)?;
    let (leaf_index, path) = locate(state.config.merkle_tree_height, &req.events, &commitment)?;

    Ok(Json(MerklePathResponse {
        root: fr_to_hex(&path.root()),
        leaf_index,
        path_elements: path.path_elements().iter().map(fr_to_hex).collect(),
        path_indices: path.path_index_bits(),
    }))
}

// ============ Withdraw ============

#[derive(Deserialize)]
pub struct WithdrawInputsRequest {
    pub note: String,
    pub events: Vec<DepositEvent>,
    pub recipient: Address,
    #[serde(default)]
    pub relayer: Option<Address>,
    /// Base units, decimal
    #[serde(default)]
    pub fee: Option<String>,
    #[serde(default)]
    pub refund: Option<String>,
}

#[derive(Serialize)]
pub struct WithdrawInputsResponse {
    pub public_inputs: Vec<String>,
    pub circuit_input: Value,
    pub verifier_args: [String; 6],
}

fn parse_base_units(field: &'static str, value: Option<&str>) -> Result<u128, ApiError> {
    match value {
        None => Ok(0),
        Some(v) => v.parse().map_err(|_| ApiError::InvalidValue {
            field,
            value: v.to_string(),
        }),
    }
}

pub async fn withdraw_inputs(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WithdrawInputsRequest>,
) -> ApiResult<WithdrawInputsResponse> {
    let note = state.codec.decode(req.note.trim())?;
    let request = WithdrawalRequest {
        recipient: req.recipient,
        relayer: req.relayer.unwrap_or(Address::ZERO),
        fee: parse_base_units("fee", req.fee.as_deref())?,
        refund: parse_base_units("refund", req.refund.as_deref())?,
    };

    let currency = note.currency.to_lowercase();
    if request.refund != 0 && currency == state.config.native_currency.to_lowercase() {
        return Err(WithdrawError::RefundNotAllowed { currency }.into());
    }

    let (_, path) = locate(
        state.config.merkle_tree_height,
        &req.events,
        &note.deposit.commitment(),
    )?;
    let inputs = build_inputs(&note.deposit, &path, &request);

    Ok(Json(WithdrawInputsResponse {
        public_inputs: inputs.public.to_field_elements().iter().map(fr_to_hex).collect(),
        circuit_input: inputs.to_json(),
        verifier_args: inputs.public.verifier_args(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{app, AppState};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use mixer_notes::{CommitmentScheme, SECRET_BYTES};
    use mixer_prover::MixerConfig;
    use serde_json::json;
    use tower::ServiceExt;

    const CONFIG: &str = r#"
merkle_tree_height = 4

[deployments.1]
proxy = "0x00000000000000000000000000000000000000aa"

[deployments.1.currencies.eth.instances]
"1" = "0x0000000000000000000000000000000000000001"
"#;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(MixerConfig::from_toml_str(CONFIG).unwrap()))
    }

    async fn post(uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app(state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    /// Three deposits with ours in the middle, leaf indices as RPC strings.
    fn events_with(commitment: &str) -> Value {
        let filler = |n: u64| fr_to_hex(&ark_bn254::Fr::from(n));
        json!([
            {
                "blockNumber": 12,
                "transactionHash": "0x03",
                "commitment": filler(3),
                "leafIndex": "2",
                "timestamp": "1700000020",
            },
            {
                "blockNumber": 10,
                "transactionHash": "0x01",
                "commitment": filler(1),
                "leafIndex": "0",
                "timestamp": "1700000000",
            },
            {
                "blockNumber": 11,
                "transactionHash": "0x02",
                "commitment": commitment,
                "leafIndex": 1,
                "timestamp": 1700000010,
            },
        ])
    }

    fn sample_note() -> (String, mixer_notes::Deposit) {
        let deposit = CommitmentScheme::new(PoseidonCompression)
            .derive([8u8; SECRET_BYTES], [9u8; SECRET_BYTES]);
        let note = state().codec.encode(&deposit, "eth", "1", 1).unwrap();
        (note, deposit)
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_deposit_then_parse() {
        let (status, created) = post(
            "/api/deposit/create",
            json!({ "currency": "eth", "amount": "1", "network_id": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["value"], "1000000000000000000");

        let (status, parsed) = post("/api/note/parse", json!({ "note": created["note"] })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parsed["currency"], "eth");
        assert_eq!(parsed["network_id"], 1);
        assert_eq!(parsed["commitment"], created["commitment"]);
        assert_eq!(parsed["nullifier_hash"], created["nullifier_hash"]);
    }

    #[tokio::test]
    async fn test_create_deposit_unknown_instance() {
        let (status, body) = post(
            "/api/deposit/create",
            json!({ "currency": "eth", "amount": "100", "network_id": 1 }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("instance"));
    }

    #[tokio::test]
    async fn test_parse_malformed_note() {
        let (status, body) = post(
            "/api/note/parse",
            json!({ "note": "interstellar-eth-1-1-0x00" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid format"));
    }

    #[tokio::test]
    async fn test_merkle_path() {
        let (_, deposit) = sample_note();
        let commitment = deposit.commitment_hex();
        let (status, body) = post(
            "/api/merkle/path",
            json!({ "events": events_with(&commitment), "commitment": commitment }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["leaf_index"], 1);
        assert_eq!(body["path_indices"], json!([1, 0, 0, 0]));
        assert_eq!(body["path_elements"].as_array().unwrap().len(), 4);
        assert_eq!(body["path_elements"][0], fr_to_hex(&ark_bn254::Fr::from(1u64)));
    }

    #[tokio::test]
    async fn test_merkle_path_missing_commitment() {
        let (_, deposit) = sample_note();
        let (status, body) = post(
            "/api/merkle/path",
            json!({
                "events": events_with(&deposit.commitment_hex()),
                "commitment": fr_to_hex(&ark_bn254::Fr::from(77u64)),
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_withdraw_inputs() {
        let (note, deposit) = sample_note();
        let (status, body) = post(
            "/api/withdraw/inputs",
            json!({
                "note": note,
                "events": events_with(&deposit.commitment_hex()),
                "recipient": "0x00000000000000000000000000000000000000ff",
                "fee": "1000",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["public_inputs"].as_array().unwrap().len(), 6);
        assert_eq!(body["verifier_args"][1], deposit.nullifier_hash_hex());
        assert_eq!(
            body["verifier_args"][3],
            "0x0000000000000000000000000000000000000000"
        );
        assert_eq!(body["circuit_input"]["recipient"], "255");
        assert_eq!(body["circuit_input"]["fee"], "1000");
        assert_eq!(body["circuit_input"]["pathIndices"], json!(["1", "0", "0", "0"]));
    }

    #[tokio::test]
    async fn test_withdraw_inputs_refund_on_native() {
        let (note, deposit) = sample_note();
        let (status, body) = post(
            "/api/withdraw/inputs",
            json!({
                "note": note,
                "events": events_with(&deposit.commitment_hex()),
                "recipient": "0x00000000000000000000000000000000000000ff",
                "refund": "1",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("refund"));
    }
}
