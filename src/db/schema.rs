//! Ledger schema
//!
//! Applied at startup; every statement is idempotent.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id             BIGSERIAL PRIMARY KEY,
    account_number BIGINT NOT NULL,
    balance        NUMERIC(20, 5) NOT NULL,
    created_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at     TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_accounts_account_number UNIQUE (account_number),
    CONSTRAINT chk_accounts_account_number_positive CHECK (account_number > 0),
    CONSTRAINT chk_accounts_balance_non_negative CHECK (balance >= 0)
);

CREATE TABLE IF NOT EXISTS transfers (
    id                     BIGSERIAL PRIMARY KEY,
    source_account_id      BIGINT NOT NULL REFERENCES accounts (id) ON DELETE RESTRICT,
    destination_account_id BIGINT NOT NULL REFERENCES accounts (id) ON DELETE RESTRICT,
    amount                 NUMERIC(20, 5) NOT NULL,
    created_at             TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT chk_transfers_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transfers_no_self_transfer CHECK (source_account_id <> destination_account_id)
);

CREATE INDEX IF NOT EXISTS idx_accounts_account_number ON accounts (account_number);
CREATE INDEX IF NOT EXISTS idx_transfers_accounts ON transfers (source_account_id, destination_account_id);
CREATE INDEX IF NOT EXISTS idx_transfers_destination ON transfers (destination_account_id);
CREATE INDEX IF NOT EXISTS idx_transfers_amount ON transfers (amount);
CREATE INDEX IF NOT EXISTS idx_transfers_created_at ON transfers (created_at);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_carries_ledger_constraints() {
        assert!(SCHEMA_SQL.contains("CHECK (balance >= 0)"));
        assert!(SCHEMA_SQL.contains("CHECK (amount > 0)"));
        assert!(SCHEMA_SQL.contains("CHECK (source_account_id <> destination_account_id)"));
        assert_eq!(SCHEMA_SQL.matches("ON DELETE RESTRICT").count(), 2);
        assert!(SCHEMA_SQL.contains("NUMERIC(20, 5)"));
    }
}
