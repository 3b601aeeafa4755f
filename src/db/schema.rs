pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS vulnerabilities (
    cve_id TEXT PRIMARY KEY,
    description TEXT NOT NULL,
    source TEXT NOT NULL,
    cvss_score REAL,
    cvss_vector TEXT,
    published TEXT,
    vendor_product TEXT,
    known_exploited INTEGER NOT NULL DEFAULT 0,
    raw_source TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS bio_impact_scores (
    id TEXT PRIMARY KEY,
    cve_id TEXT NOT NULL UNIQUE REFERENCES vulnerabilities(cve_id) ON DELETE CASCADE,
    human_safety REAL NOT NULL,
    supply_chain REAL NOT NULL,
    exploitability REAL NOT NULL,
    patch_availability REAL NOT NULL,
    composite REAL NOT NULL,
    priority TEXT NOT NULL,
    confidence REAL,
    affected_sectors TEXT,
    ai_audit TEXT,
    model_version TEXT NOT NULL DEFAULT '',
    needs_human_review INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recommendations (
    id TEXT PRIMARY KEY,
    cve_id TEXT NOT NULL REFERENCES vulnerabilities(cve_id) ON DELETE CASCADE,
    recommendation_type TEXT NOT NULL,
    action TEXT NOT NULL,
    safe_to_implement INTEGER NOT NULL DEFAULT 1,
    tier2_escalation_required INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_vulns_known_exploited ON vulnerabilities(known_exploited);
CREATE INDEX IF NOT EXISTS idx_scores_priority ON bio_impact_scores(priority);
CREATE INDEX IF NOT EXISTS idx_recommendations_cve ON recommendations(cve_id);
";
