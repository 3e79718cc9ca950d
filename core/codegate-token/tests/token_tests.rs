use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use codegate_token::{TokenError, TokenKeys, TokenService, DEFAULT_TTL_SECS};

fn service() -> TokenService {
    TokenService::new(TokenKeys::new("test-admin-secret", "test-app-secret"))
}

// ── Round trips ──────────────────────────────────────────────────

#[test]
fn admin_token_round_trip() {
    let svc = service();
    let token = svc.issue_admin(42).unwrap();
    assert_eq!(svc.verify_admin(&token).unwrap(), 42);
}

#[test]
fn code_token_round_trip() {
    let svc = service();
    let token = svc.issue_code(7).unwrap();
    assert_eq!(svc.verify_code(&token).unwrap(), 7);
}

#[test]
fn verify_tolerates_surrounding_whitespace() {
    let svc = service();
    let token = svc.issue_admin(1).unwrap();
    let padded = format!("  {token}  ");
    assert_eq!(svc.verify_admin(&padded).unwrap(), 1);
}

// ── Domain separation ────────────────────────────────────────────

#[test]
fn admin_token_fails_as_code_token() {
    let svc = service();
    let token = svc.issue_admin(42).unwrap();
    assert!(matches!(
        svc.verify_code(&token),
        Err(TokenError::Invalid(_))
    ));
}

#[test]
fn code_token_fails_as_admin_token() {
    let svc = service();
    let token = svc.issue_code(7).unwrap();
    assert!(matches!(
        svc.verify_admin(&token),
        Err(TokenError::Invalid(_))
    ));
}

#[test]
fn cross_domain_rejected_even_with_identical_secrets() {
    // Same key in both domains: the subject tag alone must separate them.
    let svc = TokenService::new(TokenKeys::new("shared", "shared"));
    let admin_token = svc.issue_admin(1).unwrap();
    let code_token = svc.issue_code(1).unwrap();
    assert!(svc.verify_code(&admin_token).is_err());
    assert!(svc.verify_admin(&code_token).is_err());
}

#[test]
fn token_from_different_keys_rejected() {
    let a = TokenService::new(TokenKeys::new("secret-a", "secret-a2"));
    let b = TokenService::new(TokenKeys::new("secret-b", "secret-b2"));
    let token = a.issue_admin(1).unwrap();
    assert!(matches!(b.verify_admin(&token), Err(TokenError::Invalid(_))));
}

// ── Malformed tokens ─────────────────────────────────────────────

#[test]
fn rejects_wrong_part_count() {
    let svc = service();
    assert!(svc.verify_admin("only-one-part").is_err());
    assert!(svc.verify_admin("two.parts").is_err());
    assert!(svc.verify_admin("a.b.c.d").is_err());
}

#[test]
fn rejects_bad_base64() {
    let svc = service();
    assert!(svc.verify_admin("!!!.@@@.###").is_err());
}

#[test]
fn rejects_tampered_claims() {
    let svc = service();
    let token = svc.issue_admin(42).unwrap();
    let parts: Vec<&str> = token.split('.').collect();

    // Re-encode claims with a different bound id; signature no longer matches.
    let claims_json = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
    let tampered_json = String::from_utf8(claims_json)
        .unwrap()
        .replace("42", "9999");
    let tampered = format!(
        "{}.{}.{}",
        parts[0],
        URL_SAFE_NO_PAD.encode(tampered_json.as_bytes()),
        parts[2]
    );
    assert!(matches!(
        svc.verify_admin(&tampered),
        Err(TokenError::Invalid(_))
    ));
}

#[test]
fn rejects_tampered_signature() {
    let svc = service();
    let token = svc.issue_admin(42).unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let tampered = format!("{}.{}.{}", parts[0], parts[1], URL_SAFE_NO_PAD.encode(b"x"));
    assert!(svc.verify_admin(&tampered).is_err());
}

#[test]
fn rejects_non_jwt_header() {
    let svc = service();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(br#"{"sub":"admin","boundId":1,"iat":0,"exp":0}"#);
    let forged = format!("{header}.{claims}.AAAA");
    assert!(svc.verify_admin(&forged).is_err());
}

// ── Expiry ───────────────────────────────────────────────────────

#[test]
fn expired_token_reports_expired_not_invalid() {
    let svc = TokenService::new(TokenKeys::new("a", "b").with_ttl(-60));
    let token = svc.issue_admin(1).unwrap();
    assert!(matches!(svc.verify_admin(&token), Err(TokenError::Expired)));
}

#[test]
fn expired_code_token_reports_expired() {
    let svc = TokenService::new(TokenKeys::new("a", "b").with_ttl(-60));
    let token = svc.issue_code(1).unwrap();
    assert!(matches!(svc.verify_code(&token), Err(TokenError::Expired)));
}

#[test]
fn fresh_token_embeds_expected_window() {
    let svc = service();
    let token = svc.issue_admin(1).unwrap();
    let parts: Vec<&str> = token.split('.').collect();
    let claims: serde_json::Value =
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();

    let iat = claims["iat"].as_i64().unwrap();
    let exp = claims["exp"].as_i64().unwrap();
    assert_eq!(exp - iat, DEFAULT_TTL_SECS);
    assert_eq!(claims["sub"], "admin");
    assert_eq!(claims["boundId"], 1);
}
