//! Detection rules as declarative data.
//!
//! Rules live here as plain tables so adding coverage is an addition to
//! data, not a new code branch, and each rule is unit-testable on its own.
//! Patterns are compiled once at engine construction
//! (case-insensitive, multi-line).

/// A fast-tier rule: pattern plus the category reported for each match.
pub struct FastRule {
    /// Regex source, compiled case-insensitive and multi-line.
    pub pattern: &'static str,
    /// Taxonomy label reported for matches (e.g. "Hardcoded password").
    pub category: &'static str,
}

/// Fast tier: a small fixed list covering hardcoded-secret shapes, naive
/// SQL-injection shapes, and XSS shapes. Cheap coarse pre-filter; every
/// match is HIGH.
pub const FAST_RULES: &[FastRule] = &[
    // Hardcoded secrets
    FastRule {
        pattern: r#"password\s*=\s*["'][^"']+["']"#,
        category: "Hardcoded password",
    },
    FastRule {
        pattern: r#"api[_-]?key\s*=\s*["'][^"']+["']"#,
        category: "Hardcoded API key",
    },
    FastRule {
        pattern: r#"secret\s*=\s*["'][^"']+["']"#,
        category: "Hardcoded secret",
    },
    FastRule {
        pattern: r#"token\s*=\s*["'][^"']+["']"#,
        category: "Hardcoded token",
    },
    FastRule {
        pattern: r"AKIA[0-9A-Z]{16}",
        category: "AWS Access Key",
    },
    // SQL injection
    FastRule {
        pattern: r#"execute\s*\(\s*["'].*\+.*["']"#,
        category: "Potential SQL injection",
    },
    FastRule {
        pattern: r#"query\s*\(\s*["'].*\+.*["']"#,
        category: "Potential SQL injection",
    },
    FastRule {
        pattern: r"\.format\s*\(.*\).*execute",
        category: "SQL injection via format",
    },
    // XSS
    FastRule {
        pattern: r"innerHTML\s*=",
        category: "Potential XSS via innerHTML",
    },
    FastRule {
        pattern: r"dangerouslySetInnerHTML",
        category: "Potential XSS in React",
    },
    FastRule {
        pattern: r"eval\s*\(",
        category: "Dangerous eval usage",
    },
];

/// A deep-tier rule: pattern, taxonomy group, and the detail reported in
/// the finding description.
pub struct DeepRule {
    /// Regex source, compiled case-insensitive and multi-line.
    pub pattern: &'static str,
    /// Taxonomy group (finding category), e.g. "Injection".
    pub group: &'static str,
    /// Specific detail appended to the group in the description.
    pub detail: &'static str,
}

/// Deep tier: ten fixed groups mirroring a standard vulnerability taxonomy.
/// Severity is derived from the description text: injection / hardcoded /
/// exposed issues are CRITICAL, everything else HIGH.
pub const DEEP_RULES: &[DeepRule] = &[
    // Broken access control
    DeepRule {
        pattern: r"@app\.route.*methods=\[.*GET.*POST",
        group: "Access Control",
        detail: "Missing access control - GET and POST on same route",
    },
    DeepRule {
        pattern: r"if\s+user\.is_admin\s*==\s*True",
        group: "Access Control",
        detail: "Hardcoded admin check - use role-based access",
    },
    // Cryptographic failures
    DeepRule {
        pattern: r#"password\s*=\s*["'][^"']+["']"#,
        group: "Cryptographic Failure",
        detail: "Hardcoded password",
    },
    DeepRule {
        pattern: r#"api[_-]?key\s*=\s*["'][^"']+["']"#,
        group: "Cryptographic Failure",
        detail: "Hardcoded API key",
    },
    DeepRule {
        pattern: r#"secret\s*=\s*["'][^"']+["']"#,
        group: "Cryptographic Failure",
        detail: "Hardcoded secret",
    },
    DeepRule {
        pattern: r#"token\s*=\s*["'][^"']+["']"#,
        group: "Cryptographic Failure",
        detail: "Hardcoded token",
    },
    DeepRule {
        pattern: r"AKIA[0-9A-Z]{16}",
        group: "Cryptographic Failure",
        detail: "AWS Access Key exposed",
    },
    DeepRule {
        pattern: r"md5\(",
        group: "Cryptographic Failure",
        detail: "Weak hashing algorithm (MD5)",
    },
    DeepRule {
        pattern: r"sha1\(",
        group: "Cryptographic Failure",
        detail: "Weak hashing algorithm (SHA1)",
    },
    // Injection (SQL, OS command, code)
    DeepRule {
        pattern: r#"execute\s*\(\s*["'].*\+.*["']"#,
        group: "Injection",
        detail: "SQL injection risk - use parameterized queries",
    },
    DeepRule {
        pattern: r#"query\s*\(\s*["'].*\+.*["']"#,
        group: "Injection",
        detail: "SQL injection risk",
    },
    DeepRule {
        pattern: r"\.format\s*\(.*\).*execute",
        group: "Injection",
        detail: "SQL injection via format()",
    },
    DeepRule {
        pattern: r"eval\s*\(",
        group: "Injection",
        detail: "Code injection via eval()",
    },
    DeepRule {
        pattern: r"exec\s*\(",
        group: "Injection",
        detail: "Code injection via exec()",
    },
    DeepRule {
        pattern: r"os\.system\s*\(.*\+",
        group: "Injection",
        detail: "OS command injection",
    },
    DeepRule {
        pattern: r"subprocess\.call\s*\(.*\+",
        group: "Injection",
        detail: "OS command injection",
    },
    // Insecure design
    DeepRule {
        pattern: r"sleep\s*\(\s*\d+\s*\)",
        group: "Insecure Design",
        detail: "Potential timing attack vulnerability",
    },
    DeepRule {
        pattern: r"random\.random\(\)",
        group: "Insecure Design",
        detail: "Insecure randomness - use a CSPRNG",
    },
    // Security misconfiguration
    DeepRule {
        pattern: r"DEBUG\s*=\s*True",
        group: "Misconfiguration",
        detail: "Debug mode enabled in production",
    },
    DeepRule {
        pattern: r#"ALLOWED_HOSTS\s*=\s*\[\s*["']?\*["']?\s*\]"#,
        group: "Misconfiguration",
        detail: "Wildcard in ALLOWED_HOSTS",
    },
    DeepRule {
        pattern: r"verify\s*=\s*False",
        group: "Misconfiguration",
        detail: "SSL verification disabled",
    },
    // Authentication failures
    DeepRule {
        pattern: r"session\[.*\]\s*=\s*user",
        group: "Authentication",
        detail: "Session fixation risk",
    },
    DeepRule {
        pattern: r"cookie.*secure\s*=\s*False",
        group: "Authentication",
        detail: "Insecure cookie configuration",
    },
    DeepRule {
        pattern: r"password.*==.*input",
        group: "Authentication",
        detail: "Plain text password comparison",
    },
    // Software and data integrity failures
    DeepRule {
        pattern: r"pickle\.loads?\(",
        group: "Data Integrity",
        detail: "Insecure deserialization",
    },
    DeepRule {
        pattern: r"yaml\.load\(",
        group: "Data Integrity",
        detail: "Unsafe YAML deserialization - use safe_load",
    },
    // Logging and monitoring failures
    DeepRule {
        pattern: r"except.*:\s*pass",
        group: "Logging",
        detail: "Swallowed exception - no logging",
    },
    DeepRule {
        pattern: r"except.*:\s*continue",
        group: "Logging",
        detail: "Swallowed exception - no logging",
    },
    // Server-side request forgery
    DeepRule {
        pattern: r"requests\.get\s*\(\s*user",
        group: "SSRF",
        detail: "SSRF risk - validate URL",
    },
    DeepRule {
        pattern: r"urllib\.request\s*\(\s*user",
        group: "SSRF",
        detail: "SSRF risk - validate URL",
    },
    // Cross-site scripting
    DeepRule {
        pattern: r"innerHTML\s*=",
        group: "XSS",
        detail: "XSS risk via innerHTML",
    },
    DeepRule {
        pattern: r"dangerouslySetInnerHTML",
        group: "XSS",
        detail: "XSS risk in React",
    },
    DeepRule {
        pattern: r"document\.write\s*\(",
        group: "XSS",
        detail: "XSS risk via document.write",
    },
];
