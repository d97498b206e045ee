use phishscan::domain::{parse_domain, DomainParseError};

#[test]
fn test_bare_and_url_inputs() {
    assert_eq!(parse_domain("example.com").unwrap().as_str(), "example.com");
    assert_eq!(
        parse_domain("http://good-old-site.test/path").unwrap().as_str(),
        "good-old-site.test"
    );
    assert_eq!(
        parse_domain("  https://Login.Example.COM/account?id=1#x  ").unwrap().as_str(),
        "login.example.com"
    );
    assert_eq!(
        parse_domain("sub.example.co.uk/some/path").unwrap().as_str(),
        "sub.example.co.uk"
    );
}

#[test]
fn test_authority_keeps_port_and_userinfo() {
    assert_eq!(
        parse_domain("https://example.com:8443/").unwrap().as_str(),
        "example.com:8443"
    );
    assert_eq!(
        parse_domain("example.com:8080").unwrap().as_str(),
        "example.com:8080"
    );
    assert_eq!(
        parse_domain("http://user@Evil.example/").unwrap().as_str(),
        "user@evil.example"
    );
}

#[test]
fn test_empty_input() {
    assert_eq!(parse_domain(""), Err(DomainParseError::EmptyInput));
    assert_eq!(parse_domain(" \t\n "), Err(DomainParseError::EmptyInput));
}

#[test]
fn test_authority_without_dot_is_invalid() {
    for input in ["localhost", "http://intranet/", "https://router:8080", "foo"] {
        assert!(
            matches!(parse_domain(input), Err(DomainParseError::InvalidFormat(_))),
            "expected InvalidFormat for {:?}",
            input
        );
    }
}

#[test]
fn test_empty_authority_is_invalid() {
    assert!(matches!(
        parse_domain("https:///path.html"),
        Err(DomainParseError::InvalidFormat(_))
    ));
}

#[test]
fn test_leading_trailing_and_double_dots_are_invalid() {
    for input in [
        ".example.com",
        "example.com.",
        "http://.example.com/",
        "https://example.com./",
        "example..com",
        "http://sub..example.com",
    ] {
        assert!(
            matches!(parse_domain(input), Err(DomainParseError::InvalidFormat(_))),
            "expected InvalidFormat for {:?}",
            input
        );
    }
}

#[test]
fn test_malformed_urls_surface_as_parse_error() {
    assert!(matches!(
        parse_domain("http://[::1.example.com/"),
        Err(DomainParseError::ParseError(_))
    ));
    assert!(matches!(
        parse_domain("http://exa mple.com/"),
        Err(DomainParseError::ParseError(_))
    ));
}

#[test]
fn test_parse_is_idempotent() {
    for input in [
        "example.com",
        "HTTPS://WWW.Example.com/a/b",
        "http://user@site.example:81/x",
        "shop.example.net?ref=mail",
    ] {
        let first = parse_domain(input).unwrap();
        let second = parse_domain(first.as_str()).unwrap();
        assert_eq!(first, second, "not idempotent for {:?}", input);
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(DomainParseError::EmptyInput.to_string(), "no input provided");
    let err = parse_domain("localhost").unwrap_err();
    assert!(err.to_string().starts_with("invalid domain format"));
}
