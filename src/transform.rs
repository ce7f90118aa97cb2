/// Block Transformer Module
///
/// Pure reshaping of a raw chain-node `Block` into the compact
/// `OutboundRecord` published downstream: per-transaction status, balance
/// deltas, and resolved instruction accounts/program ids.
use crate::error::ChainError;
use crate::models::{Block, BalanceChange, Instruction, OutboundRecord, RawTransaction, TransactionProjection};

/// Project a raw block into its outbound form. Fails only if a transaction
/// carries no signatures, which the chain node never legitimately produces.
pub fn project(block: &Block, now_unix: u64) -> Result<OutboundRecord, ChainError> {
    let transactions = block
        .transactions
        .iter()
        .map(project_transaction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(OutboundRecord {
        block_height: block.block_height,
        block_time: block.block_time,
        blockhash: block.blockhash.clone(),
        parent_slot: block.parent_slot,
        previous_blockhash: block.previous_blockhash.clone(),
        transactions,
        timestamp: now_unix,
    })
}

fn project_transaction(tx: &RawTransaction) -> Result<TransactionProjection, ChainError> {
    let signature = tx
        .transaction
        .signatures
        .first()
        .cloned()
        .ok_or_else(|| ChainError::Decode("transaction has no signatures".into()))?;

    let status = if tx.meta.err.is_some() { "Failed" } else { "Success" }.to_string();

    let account_keys: Vec<String> =
        tx.transaction.message.account_keys.iter().map(|k| k.pubkey().to_string()).collect();

    Ok(TransactionProjection {
        signature,
        status,
        fee: tx.meta.fee,
        account_keys: account_keys.clone(),
        instructions: project_instructions(tx, &account_keys),
        balance_changes: project_balance_changes(tx, &account_keys),
        token_balances: tx.meta.post_token_balances.iter().map(|b| b.ui_token_amount.clone()).collect(),
        compute_units: tx.meta.compute_units_consumed,
        log_messages: tx.meta.log_messages.clone(),
    })
}

fn project_balance_changes(tx: &RawTransaction, account_keys: &[String]) -> Vec<BalanceChange> {
    account_keys
        .iter()
        .enumerate()
        .filter_map(|(i, key)| {
            let pre = *tx.meta.pre_balances.get(i)?;
            let post = *tx.meta.post_balances.get(i)?;
            if pre == post {
                return None;
            }
            Some(BalanceChange { account: key.clone(), pre_balance: pre, post_balance: post, change: post as i64 - pre as i64 })
        })
        .collect()
}

fn project_instructions(tx: &RawTransaction, account_keys: &[String]) -> Vec<Instruction> {
    tx.transaction
        .message
        .instructions
        .iter()
        .map(|inst| {
            let accounts = inst
                .accounts
                .iter()
                .filter_map(|&idx| account_keys.get(idx as usize).cloned())
                .collect();
            let program_id = account_keys.get(inst.program_id_index as usize).cloned().unwrap_or_default();

            Instruction { program_id, data: inst.data.clone(), accounts }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block(err: Option<serde_json::Value>) -> Block {
        serde_json::from_value(serde_json::json!({
            "blockHeight": 100,
            "blockTime": 1700000000,
            "blockhash": "hashA",
            "parentSlot": 99,
            "previousBlockhash": "hashParent",
            "transactions": [{
                "meta": {
                    "err": err,
                    "fee": 5000,
                    "preBalances": [1000, 2000],
                    "postBalances": [995000, 2005000],
                    "postTokenBalances": [],
                    "logMessages": ["log1"],
                    "computeUnitsConsumed": 150,
                },
                "transaction": {
                    "message": {
                        "accountKeys": ["acct1", "acct2"],
                        "instructions": [{
                            "accounts": [0, 1],
                            "data": "abcd",
                            "programIdIndex": 1,
                        }],
                    },
                    "signatures": ["sig1"],
                },
            }],
        }))
        .unwrap()
    }

    #[test]
    fn projects_success_status_and_balance_changes() {
        let block = sample_block(None);
        let record = project(&block, 42).unwrap();

        assert_eq!(record.block_height, 100);
        assert_eq!(record.timestamp, 42);
        let tx = &record.transactions[0];
        assert_eq!(tx.status, "Success");
        assert_eq!(tx.signature, "sig1");
        assert_eq!(tx.balance_changes.len(), 2);
        assert_eq!(tx.balance_changes[0].change, 995000 - 1000);
    }

    #[test]
    fn failed_transaction_gets_failed_status() {
        let block = sample_block(Some(serde_json::json!({"InstructionError": [0, "Custom"]})));
        let record = project(&block, 1).unwrap();
        assert_eq!(record.transactions[0].status, "Failed");
    }

    #[test]
    fn instruction_resolves_program_id_and_accounts_from_indices() {
        let block = sample_block(None);
        let record = project(&block, 1).unwrap();
        let inst = &record.transactions[0].instructions[0];
        assert_eq!(inst.program_id, "acct2");
        assert_eq!(inst.accounts, vec!["acct1".to_string(), "acct2".to_string()]);
    }

    #[test]
    fn unchanged_balances_are_not_reported() {
        let mut value = serde_json::json!({
            "blockHeight": 1, "blockTime": null, "blockhash": "h", "parentSlot": 0,
            "previousBlockhash": "p",
            "transactions": [{
                "meta": {"err": null, "fee": 0, "preBalances": [500], "postBalances": [500],
                          "postTokenBalances": [], "logMessages": [], "computeUnitsConsumed": 0},
                "transaction": {"message": {"accountKeys": ["a"], "instructions": []}, "signatures": ["s"]},
            }],
        });
        let block: Block = serde_json::from_value(value.take()).unwrap();
        let record = project(&block, 1).unwrap();
        assert!(record.transactions[0].balance_changes.is_empty());
    }

    #[test]
    fn single_account_delta_is_reported_exactly() {
        let mut value = serde_json::json!({
            "blockHeight": 1, "blockTime": null, "blockhash": "h", "parentSlot": 0,
            "previousBlockhash": "p",
            "transactions": [{
                "meta": {"err": null, "fee": 0, "preBalances": [10, 20, 30], "postBalances": [10, 25, 30],
                          "postTokenBalances": [], "logMessages": [], "computeUnitsConsumed": 0},
                "transaction": {"message": {"accountKeys": ["A", "B", "C"], "instructions": []}, "signatures": ["s"]},
            }],
        });
        let block: Block = serde_json::from_value(value.take()).unwrap();
        let record = project(&block, 1).unwrap();
        let tx = &record.transactions[0];

        assert_eq!(tx.status, "Success");
        assert_eq!(tx.balance_changes.len(), 1);
        assert_eq!(tx.balance_changes[0].account, "B");
        assert_eq!(tx.balance_changes[0].pre_balance, 20);
        assert_eq!(tx.balance_changes[0].post_balance, 25);
        assert_eq!(tx.balance_changes[0].change, 5);
    }

    #[test]
    fn missing_signature_is_a_decode_error() {
        let mut value = serde_json::json!({
            "blockHeight": 1, "blockTime": null, "blockhash": "h", "parentSlot": 0,
            "previousBlockhash": "p",
            "transactions": [{
                "meta": {"err": null, "fee": 0, "preBalances": [], "postBalances": [],
                          "postTokenBalances": [], "logMessages": [], "computeUnitsConsumed": 0},
                "transaction": {"message": {"accountKeys": [], "instructions": []}, "signatures": []},
            }],
        });
        let block: Block = serde_json::from_value(value.take()).unwrap();
        let err = project(&block, 1).unwrap_err();
        assert!(matches!(err, ChainError::Decode(_)));
    }
}
