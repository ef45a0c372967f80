//! Token account and a stage that uses it.

use conveyor_core::account::{default_expiration, hash_token, Account};
use conveyor_core::prelude::*;
use serde_json::json;

/// A credential derived from a user id and passphrase.
///
/// `connect` returns an expiring token; the user id is published to
/// stage expressions under the `account` scope.
#[derive(Debug, Default)]
pub struct TokenAccount {
    user_id: String,
    passphrase: String,
    expiration: Option<i64>,
}

impl Account for TokenAccount {
    fn define_properties(&self, builder: &mut PropertyBuilder) {
        builder
            .describe("user_id", "User id")
            .required()
            .sensitivity(Sensitivity::Medium)
            .add();
        builder
            .describe("passphrase", "Passphrase")
            .required()
            .obfuscate()
            .add();
        builder
            .describe("expiration", "Expiration")
            .description("Token expiration in epoch milliseconds. Defaults to 24 hours from now.")
            .kind(PropertyKind::Integer)
            .add();
    }

    fn configure(&mut self, values: &PropertyValues) -> Result<()> {
        self.user_id = values.get("user_id")?;
        self.passphrase = values.get("passphrase")?;
        self.expiration = values.get_opt("expiration")?;
        Ok(())
    }

    fn connect(&mut self) -> Result<String> {
        let expiration = self.expiration.unwrap_or_else(default_expiration);
        tracing::debug!(user_id = %self.user_id, expiration, "issuing token");
        Ok(hash_token(&self.user_id, expiration, &self.passphrase))
    }

    fn variables(&self) -> Body {
        let mut vars = Body::new();
        vars.insert("user_id".to_string(), json!(self.user_id));
        vars
    }
}

/// Stamps each document with the account's token and user id.
///
/// # Views
/// - Input: "input0" - Any documents
/// - Output: "output0" - One `{token, user_id}` document each
///
/// The `user_id_copy` property is an expression defaulting to
/// `account.user_id`, so by default the emitted user id is the one the
/// attached account publishes.
pub struct TokenStamper {
    account: TokenAccount,
    token: String,
    user_id: Option<Expression>,
    stamped: u64,
}

impl TokenStamper {
    /// Attach a configured account.
    pub fn new(account: TokenAccount) -> Self {
        Self {
            account,
            token: String::new(),
            user_id: None,
            stamped: 0,
        }
    }
}

impl Stage for TokenStamper {
    fn info(&self) -> StageInfo {
        StageInfo::new("Token Stamper")
            .with_purpose("Stamps documents with an account token.")
    }

    fn define_properties(&self, builder: &mut PropertyBuilder) {
        builder
            .describe("user_id_copy", "User id")
            .expression()
            .default_value("account.user_id")
            .add();
    }

    fn configure(&mut self, values: &PropertyValues) -> Result<()> {
        self.token = self.account.connect()?;
        self.user_id = Some(values.as_expression("user_id_copy")?);
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        tracing::info!(stamped = self.stamped, "token stamper finished");
        self.account.disconnect()
    }
}

impl ProcessStage for TokenStamper {
    fn process(
        &mut self,
        document: Document,
        _input_view: &str,
        views: &mut ViewSet,
    ) -> std::result::Result<(), DataError> {
        let user_id = self
            .user_id
            .as_ref()
            .ok_or_else(|| DataError::new("stage is not configured"))?
            .eval_string(Some(&document))?;
        let mut out = Document::for_header(document.header(), Body::new());
        out.set("token", json!(self.token));
        out.set("user_id", json!(user_id));
        self.stamped += 1;
        views
            .write_output(out)
            .map_err(|e| DataError::new(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_core::testing::StageTester;

    fn configured_account() -> TokenAccount {
        let mut account = TokenAccount::default();
        let mut values = PropertyValues::new();
        values.set("user_id", "alice");
        values.set("passphrase", "secret");
        values.set("expiration", 1_700_000_000_000i64);
        account.configure(&values).unwrap();
        account
    }

    #[test]
    fn tokens_are_byte_identical_for_fixed_inputs() {
        let mut a = configured_account();
        let mut b = configured_account();
        assert_eq!(a.connect().unwrap(), b.connect().unwrap());
    }

    #[test]
    fn stamper_defaults_to_the_account_user_id() {
        let account = configured_account();
        let vars = account.variables();
        let mut stage = TokenStamper::new(account);

        let outcome = StageTester::new()
            .scope("account", vars)
            .input("input0", vec![Document::new()])
            .run_process(&mut stage)
            .unwrap();

        let docs = outcome.output("output0").unwrap();
        assert_eq!(
            docs[0].get("user_id").and_then(|v| v.as_string()).as_deref(),
            Some("alice")
        );
        assert!(docs[0]
            .get("token")
            .and_then(|v| v.as_string())
            .is_some_and(|t| !t.is_empty()));
    }

    #[test]
    fn user_id_copy_can_read_the_document_instead() {
        let account = configured_account();
        let mut stage = TokenStamper::new(account);

        let mut doc = Document::new();
        doc.set("owner", "from-doc");
        let outcome = StageTester::new()
            .property("user_id_copy", "$owner")
            .input("input0", vec![doc])
            .run_process(&mut stage)
            .unwrap();

        assert_eq!(
            outcome.output("output0").unwrap()[0]
                .get("user_id")
                .and_then(|v| v.as_string())
                .as_deref(),
            Some("from-doc")
        );
    }
}
