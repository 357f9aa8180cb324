//! Static login and signup forms.
//!
//! Each form posts back to its own page with the current query string
//! appended, so a pending `redirect` survives the round trip.

pub fn login_page(query: &str) -> String {
    let query = escape_attribute(query);
    format!(
        r#"<html>
	<body>
		<h1>Login</h1>
		<form action="login?{query}" method="post">
			<input name="email" type="text" placeholder="Email" />
			<input name="password" type="password" placeholder="Password" />
			<input type="submit" />
		</form>
		<a href="signup?{query}">Sign Up</a>
	</body>
</html>"#
    )
}

pub fn signup_page(query: &str) -> String {
    let query = escape_attribute(query);
    format!(
        r#"<html>
	<body>
		<h1>Sign Up</h1>
		<form action="signup?{query}" method="post">
			<input name="email" type="text" placeholder="Email" />
			<input name="password" type="password" placeholder="Password" />
			<input type="submit" />
		</form>
		<a href="login?{query}">Log In</a>
	</body>
</html>"#
    )
}

fn escape_attribute(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_page_preserves_query() {
        let page = login_page("redirect=%2Fsecured");
        assert!(page.contains(r#"action="login?redirect=%2Fsecured""#));
        assert!(page.contains(r#"href="signup?redirect=%2Fsecured""#));
    }

    #[test]
    fn test_signup_page_preserves_query() {
        let page = signup_page("redirect=%2F");
        assert!(page.contains(r#"action="signup?redirect=%2F""#));
    }

    #[test]
    fn test_query_cannot_break_out_of_attribute() {
        let page = login_page(r#"a="><script>x</script>&b=1"#);
        assert!(!page.contains("<script>"));
        assert!(page.contains("a=&quot;&gt;&lt;script&gt;x&lt;/script&gt;&amp;b=1"));
    }
}
