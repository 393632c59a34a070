//! Per-flow context resolved from configuration.

use mixer_notes::Note;

use crate::config::{InstanceDeployment, MixerConfig};
use crate::error::WithdrawError;

/// Everything a deposit or withdrawal needs to know about where it runs.
///
/// Built once per flow and passed explicitly; nothing is read from globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowContext {
    pub network_id: u64,
    pub currency: String,
    pub amount: String,
    pub tree_height: usize,
    pub native_currency: String,
    pub tag: String,
    pub deployment: InstanceDeployment,
}

impl FlowContext {
    pub fn new(
        config: &MixerConfig,
        network_id: u64,
        currency: &str,
        amount: &str,
    ) -> Result<Self, WithdrawError> {
        let deployment = config.instance(network_id, currency, amount)?;
        Ok(Self {
            network_id,
            currency: deployment.currency.clone(),
            amount: amount.to_string(),
            tree_height: config.merkle_tree_height,
            native_currency: config.native_currency.to_lowercase(),
            tag: config.tag.clone(),
            deployment,
        })
    }

    /// Context for redeeming `note` while connected to `active_network_id`.
    pub fn for_note(
        config: &MixerConfig,
        note: &Note,
        active_network_id: u64,
    ) -> Result<Self, WithdrawError> {
        if note.network_id != active_network_id {
            return Err(WithdrawError::NetworkMismatch {
                note: note.network_id,
                active: active_network_id,
            });
        }
        Self::new(config, note.network_id, &note.currency, &note.amount)
    }

    /// Whether the pool holds the ledger's native currency.
    pub fn is_native(&self) -> bool {
        self.currency == self.native_currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixer_notes::{CommitmentScheme, PoseidonCompression, SECRET_BYTES};

    fn config() -> MixerConfig {
        MixerConfig::from_toml_str(
            r#"
[deployments.1]
proxy = "0x00000000000000000000000000000000000000aa"

[deployments.1.currencies.eth.instances]
"1" = "0x0000000000000000000000000000000000000001"

[deployments.1.currencies.dai.instances]
"100" = "0x0000000000000000000000000000000000000002"
"#,
        )
        .unwrap()
    }

    fn note(network_id: u64, currency: &str, amount: &str) -> Note {
        let deposit = CommitmentScheme::new(PoseidonCompression)
            .derive([1u8; SECRET_BYTES], [2u8; SECRET_BYTES]);
        Note {
            currency: currency.into(),
            amount: amount.into(),
            network_id,
            deposit,
        }
    }

    #[test]
    fn test_context_from_note() {
        let ctx = FlowContext::for_note(&config(), &note(1, "ETH", "1"), 1).unwrap();

        assert_eq!(ctx.currency, "eth");
        assert_eq!(ctx.tree_height, 20);
        assert!(ctx.is_native());
        assert_eq!(ctx.tag, "interstellar");
    }

    #[test]
    fn test_network_mismatch() {
        let result = FlowContext::for_note(&config(), &note(5, "eth", "1"), 1);
        assert!(matches!(
            result,
            Err(WithdrawError::NetworkMismatch { note: 5, active: 1 })
        ));
    }

    #[test]
    fn test_token_not_native() {
        let ctx = FlowContext::new(&config(), 1, "dai", "100").unwrap();
        assert!(!ctx.is_native());
    }

    #[test]
    fn test_unknown_instance() {
        assert!(matches!(
            FlowContext::new(&config(), 1, "eth", "100"),
            Err(WithdrawError::Config(_))
        ));
    }
}
