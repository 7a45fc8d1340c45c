//! The search engine over the numeric and keyword indexes.

use crate::index::{
    BooleanOperator, KeywordIndex, KeywordToken, KeywordTokenizer, NumericIndex, TOKEN_BYTES,
};
use crate::paillier::{Ciphertext, Parameters, Plaintext, PublicKey, SecretKey};
use crate::proto::{
    IndexSnapshot as IndexSnapshotProto, KeywordPosting as KeywordPostingProto,
    NumericEntry as NumericEntryProto, WIRE_VERSION,
};
use crate::{Error, Result};
use itertools::Itertools;
use prost::Message;
use rand::{thread_rng, CryptoRng, RngCore};
use rayon::prelude::*;
use std::fmt::Debug;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use veil_traits::HomomorphicEncrypter;
use zeroize::Zeroizing;

/// The homomorphic index engine.
///
/// Owns a Paillier keypair and a keyword token key, together with the numeric
/// equality index and the keyword inverted index built under them. Queries
/// share the indexes; mutations are exclusive.
///
/// Numeric matching decrypts homomorphic differences and therefore requires
/// the secret key: only the key holder can answer numeric queries.
pub struct SearchEngine {
    sk: SecretKey,
    token_key: Zeroizing<[u8; TOKEN_BYTES]>,
    tokenizer: KeywordTokenizer,
    numeric: RwLock<NumericIndex>,
    keywords: RwLock<KeywordIndex>,
}

impl Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("pk", self.sk.public_key())
            .field("numeric_len", &self.numeric_len())
            .field("keyword_len", &self.read_keywords().len())
            .finish()
    }
}

impl SearchEngine {
    /// Create an engine with fresh random keys and empty indexes.
    pub fn new<R: RngCore + CryptoRng>(par: &Arc<Parameters>, rng: &mut R) -> Result<Self> {
        let sk = SecretKey::random(par, rng)?;
        let mut token_key = Zeroizing::new([0u8; TOKEN_BYTES]);
        rng.fill_bytes(&mut token_key[..]);
        Self::from_keys(sk, token_key)
    }

    /// Create an engine with empty indexes from existing keys.
    pub fn from_keys(sk: SecretKey, token_key: Zeroizing<[u8; TOKEN_BYTES]>) -> Result<Self> {
        let tokenizer = KeywordTokenizer::new(&token_key)?;
        Ok(Self {
            sk,
            token_key,
            tokenizer,
            numeric: RwLock::new(NumericIndex::new()),
            keywords: RwLock::new(KeywordIndex::new()),
        })
    }

    /// Returns the public key, for callers that encrypt their queries.
    pub fn public_key(&self) -> &Arc<PublicKey> {
        self.sk.public_key()
    }

    /// Returns the secret key of the engine.
    pub fn secret_key(&self) -> &SecretKey {
        &self.sk
    }

    /// Returns the secret keyword token key of the engine.
    pub fn token_key(&self) -> &[u8; TOKEN_BYTES] {
        &self.token_key
    }

    fn read_numeric(&self) -> RwLockReadGuard<'_, NumericIndex> {
        self.numeric.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_numeric(&self) -> RwLockWriteGuard<'_, NumericIndex> {
        self.numeric.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_keywords(&self) -> RwLockReadGuard<'_, KeywordIndex> {
        self.keywords.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_keywords(&self) -> RwLockWriteGuard<'_, KeywordIndex> {
        self.keywords.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Encrypt `value` under the public key of the engine.
    pub fn encrypt(&self, value: i64) -> Result<Ciphertext> {
        self.public_key()
            .try_encrypt(&Plaintext::from(value), &mut thread_rng())
    }

    /// Index `session_id` with the encryption of `value`, overwriting any
    /// previous entry.
    pub fn build_numeric_entry(&self, session_id: &str, value: i64) -> Result<()> {
        let ct = self.encrypt(value)?;
        self.build_numeric_entry_encrypted(session_id, ct)
    }

    /// Index `session_id` with a ciphertext encrypted by the caller.
    ///
    /// Fails with [`Error::IncompatibleKeys`] if `ct` is not under the public
    /// key of the engine.
    pub fn build_numeric_entry_encrypted(&self, session_id: &str, ct: Ciphertext) -> Result<()> {
        self.check_key(&ct)?;
        let previous = self.write_numeric().insert(session_id, ct);
        log::debug!(
            "{} numeric entry of session {}",
            if previous.is_some() { "Replaced" } else { "Added" },
            session_id
        );
        Ok(())
    }

    fn check_key(&self, ct: &Ciphertext) -> Result<()> {
        let pk = self.public_key();
        if Arc::ptr_eq(pk, ct.public_key()) || pk == ct.public_key() {
            Ok(())
        } else {
            Err(Error::IncompatibleKeys)
        }
    }

    /// Returns whether `a` and `b` encrypt the same number.
    ///
    /// Decrypts `a - b` and tests it for zero; neither operand is decrypted.
    pub fn equality_match(&self, a: &Ciphertext, b: &Ciphertext) -> Result<bool> {
        let diff = a.try_sub(b)?;
        self.sk.decrypts_to_zero(&diff)
    }

    /// Returns the sessions whose value equals the query values, combined
    /// with `operator`, in session identifier order.
    pub fn search_numeric(&self, values: &[i64], operator: BooleanOperator) -> Result<Vec<String>> {
        let queries = values
            .iter()
            .map(|v| self.encrypt(*v))
            .collect::<Result<Vec<_>>>()?;
        self.search_numeric_encrypted(&queries, operator)
    }

    /// Like [`SearchEngine::search_numeric`], for query values the caller
    /// encrypted under [`SearchEngine::public_key`].
    ///
    /// Every (session, query) pair is tested on its own: `And` requires every
    /// test of a session to succeed, `Or` any of them.
    pub fn search_numeric_encrypted(
        &self,
        queries: &[Ciphertext],
        operator: BooleanOperator,
    ) -> Result<Vec<String>> {
        if queries.is_empty() {
            return Ok(vec![]);
        }
        for q in queries {
            self.check_key(q)?;
        }

        let numeric = self.read_numeric();
        let entries = numeric.iter().collect_vec();
        let matches = entries
            .par_iter()
            .map(|(session_id, ct)| -> Result<Option<String>> {
                let hits = queries
                    .iter()
                    .map(|q| self.equality_match(ct, q))
                    .collect::<Result<Vec<bool>>>()?;
                let matched = match operator {
                    BooleanOperator::And => hits.iter().all(|&h| h),
                    BooleanOperator::Or => hits.iter().any(|&h| h),
                };
                Ok(matched.then(|| (*session_id).clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let matches = matches.into_iter().flatten().collect_vec();
        log::trace!(
            "Numeric {:?} search over {} terms matched {} of {} sessions",
            operator,
            queries.len(),
            matches.len(),
            entries.len()
        );
        Ok(matches)
    }

    /// Returns the token of `keyword` under the token key of the engine.
    pub fn keyword_token(&self, keyword: &str) -> KeywordToken {
        self.tokenizer.tokenize(keyword)
    }

    /// Add `session_id` to the postings of every keyword in `keywords`.
    ///
    /// Pairs already present are skipped.
    pub fn build_keyword_entry<I, S>(&self, session_id: &str, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = keywords
            .into_iter()
            .map(|k| self.keyword_token(k.as_ref()))
            .collect_vec();
        let mut index = self.write_keywords();
        let added = tokens
            .into_iter()
            .filter(|t| index.insert(*t, session_id))
            .count();
        log::debug!("Added {} keyword postings for session {}", added, session_id);
    }

    /// Returns the sessions holding the query keywords, combined with
    /// `operator`, in session identifier order.
    ///
    /// Unknown keywords match no session, and an empty query matches nothing.
    pub fn search_keywords<I, S>(&self, keywords: I, operator: BooleanOperator) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = keywords
            .into_iter()
            .map(|k| self.keyword_token(k.as_ref()))
            .collect_vec();
        let matches = self.read_keywords().search(&tokens, operator);
        log::trace!(
            "Keyword {:?} search over {} terms matched {} sessions",
            operator,
            tokens.len(),
            matches.len()
        );
        matches
    }

    /// Returns whether `session_id` has a numeric entry.
    pub fn contains_session(&self, session_id: &str) -> bool {
        self.read_numeric().contains(session_id)
    }

    /// Number of sessions in the numeric index.
    pub fn numeric_len(&self) -> usize {
        self.read_numeric().len()
    }

    /// Number of sessions holding `keyword`.
    pub fn posting_len(&self, keyword: &str) -> usize {
        let token = self.keyword_token(keyword);
        self.read_keywords().posting(&token).map_or(0, |p| p.len())
    }

    /// Serialize both indexes.
    ///
    /// The snapshot holds ciphertexts and tokens only, and is bound to the
    /// public key of the engine.
    pub fn export_index(&self) -> Vec<u8> {
        let numeric = self
            .read_numeric()
            .iter()
            .map(|(session_id, ct)| NumericEntryProto {
                session_id: session_id.clone(),
                value: Some(ct.into()),
            })
            .collect();
        let keywords = self
            .read_keywords()
            .iter()
            .map(|(token, sessions)| KeywordPostingProto {
                token: token.as_bytes().to_vec(),
                session_ids: sessions.iter().cloned().collect(),
            })
            .collect();
        IndexSnapshotProto {
            version: WIRE_VERSION,
            key_id: self.public_key().key_id().to_vec(),
            numeric,
            keywords,
        }
        .encode_to_vec()
    }

    /// Replace both indexes with a snapshot produced by
    /// [`SearchEngine::export_index`] under the same keys.
    pub fn import_index(&self, bytes: &[u8]) -> Result<()> {
        let proto: IndexSnapshotProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        if proto.version != WIRE_VERSION {
            return Err(Error::SerializationError);
        }
        let pk = self.public_key();
        if proto.key_id.as_slice() != pk.key_id().as_slice() {
            return Err(Error::IncompatibleKeys);
        }

        let mut numeric = NumericIndex::new();
        for entry in &proto.numeric {
            let value = entry.value.as_ref().ok_or(Error::SerializationError)?;
            numeric.insert(&entry.session_id, Ciphertext::try_from_proto(value, pk)?);
        }
        let mut keywords = KeywordIndex::new();
        for posting in &proto.keywords {
            let token = KeywordToken::from_slice(&posting.token).ok_or(Error::SerializationError)?;
            for session_id in &posting.session_ids {
                keywords.insert(token, session_id);
            }
        }

        log::info!(
            "Imported an index of {} numeric entries and {} keyword tokens",
            numeric.len(),
            keywords.len()
        );
        // Lock order: numeric, then keywords.
        let mut numeric_guard = self.write_numeric();
        let mut keywords_guard = self.write_keywords();
        *numeric_guard = numeric;
        *keywords_guard = keywords;
        Ok(())
    }
}

#[cfg(test)]
impl SearchEngine {
    pub(crate) fn random_for_tests<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let sk = SecretKey::random_for_tests(rng);
        let mut token_key = Zeroizing::new([0u8; TOKEN_BYTES]);
        rng.fill_bytes(&mut token_key[..]);
        Self::from_keys(sk, token_key).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::SearchEngine;
    use crate::index::BooleanOperator::{And, Or};
    use crate::proto::IndexSnapshot as IndexSnapshotProto;
    use crate::Error;
    use prost::Message;
    use proptest::prelude::*;
    use rand::thread_rng;
    use std::error::Error as StdError;
    use std::sync::{Arc, OnceLock};
    use zeroize::Zeroizing;

    fn keyword_engine() -> SearchEngine {
        let engine = SearchEngine::random_for_tests(&mut thread_rng());
        engine.build_keyword_entry("S1", ["project", "alpha", "secure"]);
        engine.build_keyword_entry("S2", ["bravo", "test"]);
        engine.build_keyword_entry("S3", ["gamma", "project"]);
        engine
    }

    #[test]
    fn keyword_boolean_composition() {
        let engine = keyword_engine();
        assert_eq!(engine.search_keywords(["project", "alpha"], And), vec!["S1"]);
        assert_eq!(
            engine.search_keywords(["project", "bravo"], Or),
            vec!["S1", "S2", "S3"]
        );
        assert!(engine.search_keywords(["project", "zebra"], And).is_empty());
        assert_eq!(engine.search_keywords(["project", "zebra"], Or), vec!["S1", "S3"]);
        assert!(engine.search_keywords(Vec::<String>::new(), Or).is_empty());
        assert!(engine.search_keywords(Vec::<&str>::new(), And).is_empty());
    }

    #[test]
    fn keyword_insert_is_idempotent() {
        let engine = keyword_engine();
        assert_eq!(engine.posting_len("project"), 2);
        engine.build_keyword_entry("S1", ["project", "project"]);
        assert_eq!(engine.posting_len("project"), 2);
        assert_eq!(engine.posting_len("zebra"), 0);
    }

    #[test]
    fn equality_soundness() -> Result<(), Box<dyn StdError>> {
        let engine = SearchEngine::random_for_tests(&mut thread_rng());
        for (a, b) in [(0, 0), (42, 42), (-7, -7), (i64::MAX, i64::MAX)] {
            assert!(engine.equality_match(&engine.encrypt(a)?, &engine.encrypt(b)?)?);
        }
        for (a, b) in [(0, 1), (42, -42), (-7, 7), (i64::MIN, i64::MAX), (1, 2)] {
            assert!(!engine.equality_match(&engine.encrypt(a)?, &engine.encrypt(b)?)?);
        }
        Ok(())
    }

    #[test]
    fn numeric_search() -> Result<(), Box<dyn StdError>> {
        let engine = SearchEngine::random_for_tests(&mut thread_rng());
        for (session, value) in [("alpha", 1), ("bravo", 3), ("charlie", 3), ("delta", 4)] {
            engine.build_numeric_entry(session, value)?;
        }
        assert_eq!(engine.numeric_len(), 4);
        assert!(engine.contains_session("bravo"));
        assert!(!engine.contains_session("echo"));

        assert_eq!(engine.search_numeric(&[3], And)?, vec!["bravo", "charlie"]);
        assert_eq!(engine.search_numeric(&[3, 3], And)?, vec!["bravo", "charlie"]);
        assert!(engine.search_numeric(&[3, 4], And)?.is_empty());
        assert_eq!(
            engine.search_numeric(&[3, 4], Or)?,
            vec!["bravo", "charlie", "delta"]
        );
        assert!(engine.search_numeric(&[5], Or)?.is_empty());
        assert!(engine.search_numeric(&[], Or)?.is_empty());

        engine.build_numeric_entry("bravo", 5)?;
        assert_eq!(engine.numeric_len(), 4);
        assert_eq!(engine.search_numeric(&[5], Or)?, vec!["bravo"]);

        let query = engine.encrypt(1)?;
        assert_eq!(engine.search_numeric_encrypted(&[query], And)?, vec!["alpha"]);
        Ok(())
    }

    #[test]
    fn cross_key_rejection() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let a = SearchEngine::random_for_tests(&mut rng);
        let b = SearchEngine::random_for_tests(&mut rng);
        a.build_numeric_entry("s1", 1)?;

        let foreign = b.encrypt(1)?;
        assert_eq!(
            a.equality_match(&a.encrypt(1)?, &foreign),
            Err(Error::IncompatibleKeys)
        );
        assert_eq!(
            a.search_numeric_encrypted(&[foreign.clone()], Or),
            Err(Error::IncompatibleKeys)
        );
        assert_eq!(
            a.build_numeric_entry_encrypted("s2", foreign),
            Err(Error::IncompatibleKeys)
        );
        assert_eq!(a.numeric_len(), 1);
        Ok(())
    }

    #[test]
    fn export_and_import() -> Result<(), Box<dyn StdError>> {
        let mut rng = thread_rng();
        let engine = keyword_engine();
        engine.build_numeric_entry("S1", 10)?;
        engine.build_numeric_entry("S2", -10)?;
        let bytes = engine.export_index();

        let restored = SearchEngine::from_keys(
            engine.secret_key().clone(),
            Zeroizing::new(*engine.token_key()),
        )?;
        restored.build_numeric_entry("stale", 0)?;
        restored.import_index(&bytes)?;
        assert_eq!(restored.numeric_len(), 2);
        assert!(!restored.contains_session("stale"));
        assert_eq!(restored.search_numeric(&[-10], Or)?, vec!["S2"]);
        assert_eq!(restored.search_keywords(["project"], Or), vec!["S1", "S3"]);
        assert!(Arc::ptr_eq(
            restored.public_key(),
            restored.secret_key().public_key()
        ));

        let other = SearchEngine::random_for_tests(&mut rng);
        assert_eq!(other.import_index(&bytes), Err(Error::IncompatibleKeys));
        assert_eq!(
            restored.import_index(b"not a snapshot"),
            Err(Error::SerializationError)
        );
        Ok(())
    }

    #[test]
    fn import_rejects_non_unit_ciphertext() -> Result<(), Box<dyn StdError>> {
        let engine = SearchEngine::random_for_tests(&mut thread_rng());
        engine.build_numeric_entry("S1", 7)?;
        let mut snapshot = IndexSnapshotProto::decode(engine.export_index().as_slice())?;

        // A multiple of n lies in [1, n^2) but is not invertible.
        let pk = engine.public_key();
        let bytes = pk.n().to_bytes_be();
        let mut value = vec![0u8; pk.ciphertext_width() - bytes.len()];
        value.extend_from_slice(&bytes);
        snapshot.numeric[0].value.as_mut().ok_or("missing value")?.value = value;

        engine.build_numeric_entry("S2", 8)?;
        assert_eq!(
            engine.import_index(&snapshot.encode_to_vec()),
            Err(Error::SerializationError)
        );
        assert_eq!(engine.numeric_len(), 2);
        assert_eq!(engine.search_numeric(&[8], Or)?, vec!["S2"]);
        Ok(())
    }

    fn shared_engine() -> &'static SearchEngine {
        static ENGINE: OnceLock<SearchEngine> = OnceLock::new();
        ENGINE.get_or_init(|| SearchEngine::random_for_tests(&mut thread_rng()))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn equality_match_agrees_with_plaintexts(a in any::<i64>(), b in any::<i64>()) {
            let engine = shared_engine();
            let ca = engine.encrypt(a).unwrap();
            let cb = engine.encrypt(b).unwrap();
            prop_assert_eq!(engine.equality_match(&ca, &cb).unwrap(), a == b);
            prop_assert!(engine.equality_match(&ca, &engine.encrypt(a).unwrap()).unwrap());
        }
    }
}
