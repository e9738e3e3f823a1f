//! Withdraw and rescue
//!
//! Withdraw is offered to the owner only and never for a vault already
//! withdrawn. Rescue recovers stray assets after withdrawal and takes either
//! `native` or a token address.

use candid::{CandidType, Deserialize, Nat};
use ic_stable_structures::Memory;
use serde::Serialize;
use crate::_2_CRITICAL_DATA::session::Session;
use crate::_4_RPC_ACCESS::abi::{self, selectors, Token};
use crate::_4_RPC_ACCESS::json_rpc::ChainReader;
use crate::infrastructure::errors::{Result, TransactionError};
use crate::infrastructure::log;
use crate::types::Address;
use super::TransactionRequest;

#[derive(CandidType, Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum RescueTarget {
    Native,
    Token(String),
}

impl RescueTarget {
    /// `native` in any case, otherwise a token address
    pub fn parse(input: &str) -> Result<RescueTarget> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("native") {
            return Ok(RescueTarget::Native);
        }
        Ok(RescueTarget::Token(Address::parse(trimmed)?.to_hex()))
    }
}

pub fn prepare_withdraw<R: ChainReader, M: Memory>(session: &Session<R, M>, vault: &Address) -> Result<TransactionRequest> {
    let record = session.vault(vault)?;

    if record.is_view_only(session.account()) {
        return Err(TransactionError::Unauthorized {
            account: session.account().to_hex(),
            vault: vault.to_hex(),
        }
        .into());
    }

    if record.withdrawn {
        return Err(TransactionError::AlreadyWithdrawn { vault: vault.to_hex() }.into());
    }

    log!("📝 Prepared withdraw from {}", vault);
    Ok(TransactionRequest {
        to: vault.to_hex(),
        data: abi::to_hex_data(&abi::encode_call(selectors::WITHDRAW, &[])),
        value: Nat::from(0u8),
        description: format!("Withdraw from {}", vault),
    })
}

pub fn prepare_rescue<R: ChainReader, M: Memory>(
    session: &Session<R, M>,
    vault: &Address,
    target: &RescueTarget,
) -> Result<TransactionRequest> {
    session.vault(vault)?;

    let (data, description) = match target {
        RescueTarget::Native => (
            abi::encode_call(selectors::RESCUE_NATIVE, &[]),
            format!("Rescue native balance from {}", vault),
        ),
        RescueTarget::Token(token) => {
            let token = Address::parse(token)?;
            (
                abi::encode_call(selectors::RESCUE_TOKEN, &[Token::Address(token)]),
                format!("Rescue token {} from {}", token, vault),
            )
        }
    };

    log!("📝 {}", description);
    Ok(TransactionRequest {
        to: vault.to_hex(),
        data: abi::to_hex_data(&data),
        value: Nat::from(0u8),
        description,
    })
}
