//! Initial database migration.
//!
//! Creates the enums, the read-only collaborator tables (calendars, books,
//! periods, chart of accounts), the journal tables, period statuses and the
//! close run log, plus the triggers guarding posted journals.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: COLLABORATOR TABLES
        // ============================================================
        db.execute_unprepared(FISCAL_CALENDARS_SQL).await?;
        db.execute_unprepared(BOOKS_SQL).await?;
        db.execute_unprepared(FISCAL_PERIODS_SQL).await?;
        db.execute_unprepared(CHART_OF_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: JOURNALS
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;

        // ============================================================
        // PART 4: PERIOD CLOSE
        // ============================================================
        db.execute_unprepared(PERIOD_STATUSES_SQL).await?;
        db.execute_unprepared(PERIOD_CLOSE_RUNS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

CREATE TYPE normal_side AS ENUM ('debit', 'credit');

CREATE TYPE journal_status AS ENUM ('draft', 'posted', 'reversed');

CREATE TYPE journal_source_type AS ENUM (
    'manual',
    'integration',
    'carry_forward',
    'year_end_close',
    'reversal'
);

CREATE TYPE period_status AS ENUM ('open', 'soft_closed', 'hard_closed');

CREATE TYPE close_status AS ENUM ('soft_closed', 'hard_closed');

CREATE TYPE close_run_status AS ENUM ('completed', 'reopened');
";

const FISCAL_CALENDARS_SQL: &str = r"
CREATE TABLE fiscal_calendars (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    name VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_fiscal_calendars_name UNIQUE (organization_id, name)
);
";

const BOOKS_SQL: &str = r"
CREATE TABLE books (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    base_currency CHAR(3) NOT NULL,
    calendar_id UUID NOT NULL REFERENCES fiscal_calendars(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_books_code UNIQUE (organization_id, code),
    CONSTRAINT chk_books_currency CHECK (base_currency ~ '^[A-Z]{3}$')
);

CREATE INDEX idx_books_organization ON books(organization_id);
";

const FISCAL_PERIODS_SQL: &str = r"
CREATE TABLE fiscal_periods (
    id UUID PRIMARY KEY,
    calendar_id UUID NOT NULL REFERENCES fiscal_calendars(id) ON DELETE CASCADE,
    fiscal_year INTEGER NOT NULL,
    period_no INTEGER NOT NULL,
    is_adjustment BOOLEAN NOT NULL DEFAULT false,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,

    CONSTRAINT uq_fiscal_periods_number UNIQUE (calendar_id, fiscal_year, period_no, is_adjustment),
    CONSTRAINT chk_fiscal_periods_dates CHECK (start_date <= end_date),
    CONSTRAINT chk_fiscal_periods_number CHECK (period_no >= 1)
);
";

const CHART_OF_ACCOUNTS_SQL: &str = r"
CREATE TABLE chart_of_accounts (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    normal_side normal_side NOT NULL,
    allow_posting BOOLEAN NOT NULL DEFAULT true,
    parent_account_id UUID REFERENCES chart_of_accounts(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_chart_of_accounts_code UNIQUE (organization_id, code),
    CONSTRAINT chk_chart_of_accounts_parent
        CHECK (parent_account_id IS NULL OR parent_account_id <> id)
);

CREATE INDEX idx_chart_of_accounts_parent ON chart_of_accounts(parent_account_id)
    WHERE parent_account_id IS NOT NULL;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    book_id UUID NOT NULL REFERENCES books(id) ON DELETE RESTRICT,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE RESTRICT,
    entry_date DATE NOT NULL,
    document_date DATE NOT NULL,
    currency_code CHAR(3) NOT NULL,
    source_type journal_source_type NOT NULL,
    description TEXT NOT NULL,
    status journal_status NOT NULL DEFAULT 'draft',
    reverses_entry_id UUID REFERENCES journal_entries(id) ON DELETE RESTRICT,
    reversed_by_entry_id UUID REFERENCES journal_entries(id) ON DELETE RESTRICT,
    created_by UUID NOT NULL,
    posted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_journal_entries_posted_at CHECK (status = 'draft' OR posted_at IS NOT NULL),
    CONSTRAINT chk_journal_entries_reversed
        CHECK (status <> 'reversed' OR reversed_by_entry_id IS NOT NULL)
);

CREATE INDEX idx_journal_entries_activity ON journal_entries(book_id, fiscal_period_id, status);
CREATE INDEX idx_journal_entries_organization ON journal_entries(organization_id);

-- An entry is reversed at most once.
CREATE UNIQUE INDEX uq_journal_entries_reverses ON journal_entries(reverses_entry_id)
    WHERE reverses_entry_id IS NOT NULL;
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES chart_of_accounts(id) ON DELETE RESTRICT,
    currency_code CHAR(3) NOT NULL,
    amount_txn NUMERIC(19, 4) NOT NULL,
    debit_base NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_base NUMERIC(19, 4) NOT NULL DEFAULT 0,
    description TEXT,

    CONSTRAINT uq_journal_lines_line_no UNIQUE (journal_entry_id, line_no),
    CONSTRAINT chk_journal_lines_non_negative CHECK (debit_base >= 0 AND credit_base >= 0),
    CONSTRAINT chk_journal_lines_one_side CHECK (debit_base = 0 OR credit_base = 0)
);

CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const PERIOD_STATUSES_SQL: &str = r"
CREATE TABLE period_statuses (
    book_id UUID NOT NULL REFERENCES books(id) ON DELETE CASCADE,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE CASCADE,
    status period_status NOT NULL DEFAULT 'open',
    updated_by UUID,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    PRIMARY KEY (book_id, fiscal_period_id)
);
";

const PERIOD_CLOSE_RUNS_SQL: &str = r"
CREATE TABLE period_close_runs (
    id UUID PRIMARY KEY,
    book_id UUID NOT NULL REFERENCES books(id) ON DELETE RESTRICT,
    fiscal_period_id UUID NOT NULL REFERENCES fiscal_periods(id) ON DELETE RESTRICT,
    generation INTEGER NOT NULL,
    requested_close_status close_status NOT NULL,
    carry_forward_journal_entry_id UUID REFERENCES journal_entries(id) ON DELETE RESTRICT,
    year_end_journal_entry_id UUID REFERENCES journal_entries(id) ON DELETE RESTRICT,
    net_income NUMERIC(19, 4) NOT NULL DEFAULT 0,
    status close_run_status NOT NULL DEFAULT 'completed',
    note TEXT,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    reopened_by UUID,
    reopened_at TIMESTAMPTZ,
    reopen_reason TEXT,

    CONSTRAINT uq_period_close_runs_generation UNIQUE (book_id, fiscal_period_id, generation),
    CONSTRAINT chk_period_close_runs_generation CHECK (generation >= 1),
    CONSTRAINT chk_period_close_runs_reopened CHECK (
        status = 'completed'
        OR (reopened_by IS NOT NULL AND reopened_at IS NOT NULL AND reopen_reason IS NOT NULL)
    )
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_journal_balance
-- Posted and reversed entries must balance in base currency
-- ============================================================
CREATE OR REPLACE FUNCTION check_journal_balance()
RETURNS TRIGGER AS $$
DECLARE
    entry_id UUID;
    entry_status journal_status;
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
BEGIN
    IF TG_TABLE_NAME = 'journal_lines' THEN
        entry_id := NEW.journal_entry_id;
    ELSE
        entry_id := NEW.id;
    END IF;

    SELECT status INTO entry_status
    FROM journal_entries
    WHERE id = entry_id;

    IF entry_status IN ('posted', 'reversed') THEN
        SELECT
            COALESCE(SUM(debit_base), 0),
            COALESCE(SUM(credit_base), 0)
        INTO total_debit, total_credit
        FROM journal_lines
        WHERE journal_entry_id = entry_id;

        IF ABS(total_debit - total_credit) >= 0.0001 THEN
            RAISE EXCEPTION 'Journal entry % is not balanced. Debit: %, Credit: %',
                entry_id, total_debit, total_credit;
        END IF;
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_journal_balance_lines
AFTER INSERT OR UPDATE ON journal_lines
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_journal_balance();

CREATE CONSTRAINT TRIGGER trg_check_journal_balance_entries
AFTER UPDATE OF status ON journal_entries
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_journal_balance();

-- ============================================================
-- FUNCTION: prevent_posted_entry_modification
-- Posted entries only ever move to reversed; nothing else changes
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_entry_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        IF OLD.status <> 'draft' THEN
            RAISE EXCEPTION 'Cannot delete % journal entry %', OLD.status, OLD.id;
        END IF;
        RETURN OLD;
    END IF;

    IF OLD.status = 'draft' THEN
        RETURN NEW;
    END IF;

    IF OLD.status = 'posted'
        AND NEW.status = 'reversed'
        AND NEW.reversed_by_entry_id IS NOT NULL
        AND (NEW.organization_id, NEW.book_id, NEW.fiscal_period_id, NEW.entry_date,
             NEW.document_date, NEW.currency_code, NEW.source_type, NEW.description,
             NEW.reverses_entry_id, NEW.created_by, NEW.posted_at)
            IS NOT DISTINCT FROM
            (OLD.organization_id, OLD.book_id, OLD.fiscal_period_id, OLD.entry_date,
             OLD.document_date, OLD.currency_code, OLD.source_type, OLD.description,
             OLD.reverses_entry_id, OLD.created_by, OLD.posted_at)
    THEN
        RETURN NEW;
    END IF;

    RAISE EXCEPTION 'Cannot modify % journal entry %. Create a reversing entry instead.',
        OLD.status, OLD.id;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_entry_mod
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_entry_modification();

-- ============================================================
-- FUNCTION: prevent_posted_line_modification
-- Lines are frozen once their entry leaves draft
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_line_modification()
RETURNS TRIGGER AS $$
DECLARE
    entry_status journal_status;
BEGIN
    SELECT status INTO entry_status
    FROM journal_entries
    WHERE id = OLD.journal_entry_id;

    IF entry_status IS NOT NULL AND entry_status <> 'draft' THEN
        RAISE EXCEPTION 'Cannot modify lines of % journal entry %',
            entry_status, OLD.journal_entry_id;
    END IF;

    IF TG_OP = 'DELETE' THEN
        RETURN OLD;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_line_mod
BEFORE UPDATE OR DELETE ON journal_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_line_modification();
";

const DROP_ALL_SQL: &str = r"
-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_posted_line_mod ON journal_lines;
DROP TRIGGER IF EXISTS trg_prevent_posted_entry_mod ON journal_entries;
DROP TRIGGER IF EXISTS trg_check_journal_balance_entries ON journal_entries;
DROP TRIGGER IF EXISTS trg_check_journal_balance_lines ON journal_lines;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_posted_line_modification();
DROP FUNCTION IF EXISTS prevent_posted_entry_modification();
DROP FUNCTION IF EXISTS check_journal_balance();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS period_close_runs CASCADE;
DROP TABLE IF EXISTS period_statuses CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS chart_of_accounts CASCADE;
DROP TABLE IF EXISTS fiscal_periods CASCADE;
DROP TABLE IF EXISTS books CASCADE;
DROP TABLE IF EXISTS fiscal_calendars CASCADE;

-- Drop enums
DROP TYPE IF EXISTS close_run_status;
DROP TYPE IF EXISTS close_status;
DROP TYPE IF EXISTS period_status;
DROP TYPE IF EXISTS journal_source_type;
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS normal_side;
DROP TYPE IF EXISTS account_type;
";
