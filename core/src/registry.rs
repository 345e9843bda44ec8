//! # Name Registry Store
//!
//! Loads, validates, and atomically persists the name-to-record mapping in a
//! JSON document:
//!
//! ```json
//! {
//!   "names": {
//!     "office": { "mac": "00:11:22:33:44:55", "ip": "10.0.0.5", "port": 7 }
//!   }
//! }
//! ```
//!
//! `ip` and `port` are omitted on disk when they equal the defaults; readers
//! fill them back in. Every stored field is re-validated on load, eagerly for
//! the document shape and per entry on decode, so a record obtained through
//! this API is always syntactically valid.
//!
//! Writes go to a fixed temp sibling and are renamed over the final path, so
//! a concurrent reader never observes a half-written document and a crash
//! mid-write leaves the previous document intact. There is no isolation
//! across load-modify-persist cycles of independent processes; the last
//! rename wins (see the test at the bottom of this module).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use wol_common::addr::{self, MacAddress};
use wol_common::config::{DEFAULT_IP, DEFAULT_PORT, StoreConfig};
use wol_common::error::{EntryProblem, Result, WolError};

/// A fully decoded registry entry. `ip` and `port` always hold concrete
/// values; defaults have already been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    pub mac: MacAddress,
    pub ip: String,
    pub port: u16,
}

/// On-disk document shape. Serialized as-is with 2-space indentation.
///
/// Entries stay raw JSON between load and persist, so hand-added fields in
/// records this tool is not touching survive a rewrite of an unrelated name.
/// Unknown top-level keys are not modeled: a rewrite canonicalizes the
/// document down to the `names` object.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    names: BTreeMap<String, Value>,
}

/// The persistent name registry.
///
/// Holds only the resolved file locations; every operation is a complete
/// load-or-persist cycle, matching the one-shot process model of the CLI.
pub struct Store {
    config: StoreConfig,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Store { config }
    }

    /// Location of the backing file, for messages.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Looks up a single saved record. Absence is `None`, not an error.
    pub fn get_name_record(&self, name: &str) -> Result<Option<HostRecord>> {
        let doc = self.load()?;
        match doc.names.get(name) {
            Some(raw) => Ok(Some(self.decode_record(name, raw)?)),
            None => Ok(None),
        }
    }

    /// Decodes the full mapping. Fails if any entry is malformed; there are
    /// no partial results.
    pub fn get_names(&self) -> Result<BTreeMap<String, HostRecord>> {
        let doc = self.load()?;
        let mut records = BTreeMap::new();
        for (name, raw) in &doc.names {
            records.insert(name.clone(), self.decode_record(name, raw)?);
        }
        Ok(records)
    }

    /// Inserts or overwrites the record for `name` and persists the result.
    ///
    /// `ip` and `port` are stored only when they differ from the defaults.
    /// A malformed existing store is a hard failure; corrupt state is never
    /// silently overwritten.
    pub fn save_name(&self, name: &str, mac: MacAddress, ip: &str, port: u16) -> Result<()> {
        let mut doc = self.load()?;

        let mut record = serde_json::Map::new();
        record.insert("mac".to_string(), Value::String(mac.to_string()));
        if ip != DEFAULT_IP {
            record.insert("ip".to_string(), Value::String(ip.to_string()));
        }
        if port != DEFAULT_PORT {
            record.insert("port".to_string(), Value::Number(port.into()));
        }

        doc.names.insert(name.to_string(), Value::Object(record));
        self.persist(&doc)
    }

    /// Removes the record for `name`, if present, and persists.
    ///
    /// Deleting an absent name is not an error, and the document is
    /// rewritten either way.
    pub fn delete_name(&self, name: &str) -> Result<()> {
        let mut doc = self.load()?;
        doc.names.remove(name);
        self.persist(&doc)
    }

    /// Reads and shape-checks the backing document.
    ///
    /// A store that cannot be opened is treated as first use and yields an
    /// empty registry; one that can be read but does not parse into the
    /// expected shape is an error.
    fn load(&self) -> Result<StoreDocument> {
        let text = match fs::read_to_string(&self.config.path) {
            Ok(text) => text,
            Err(err) => {
                debug!("no readable store at {}: {err}", self.config.path.display());
                return Ok(StoreDocument::default());
            }
        };

        serde_json::from_str(&text).map_err(|_| WolError::MalformedStore {
            path: self.config.path.clone(),
        })
    }

    /// Serializes the document to the temp sibling and renames it over the
    /// final path.
    fn persist(&self, doc: &StoreDocument) -> Result<()> {
        let write_failed = |source: std::io::Error| WolError::WriteFailed {
            path: self.config.path.clone(),
            source,
        };

        let body = serde_json::to_string_pretty(doc).map_err(|err| write_failed(err.into()))?;
        fs::write(&self.config.tmp_path, body).map_err(write_failed)?;
        fs::rename(&self.config.tmp_path, &self.config.path).map_err(write_failed)?;

        debug!("persisted {} names to {}", doc.names.len(), self.config.path.display());
        Ok(())
    }

    /// Re-validates one raw entry against the address rules and applies the
    /// defaults for absent fields.
    ///
    /// Typing happens here rather than in the document decode so that a
    /// wrong-typed field, or an entry that is not an object at all, still
    /// reports the offending entry key.
    fn decode_record(&self, name: &str, raw: &Value) -> Result<HostRecord> {
        let entry_error = |problem: EntryProblem| WolError::MalformedEntry {
            path: self.config.path.clone(),
            name: name.to_string(),
            problem,
        };

        let Some(fields) = raw.as_object() else {
            return Err(entry_error(EntryProblem::Record));
        };

        let mac: MacAddress = fields
            .get("mac")
            .and_then(Value::as_str)
            .ok_or_else(|| entry_error(EntryProblem::Mac))?
            .parse()
            .map_err(|_| entry_error(EntryProblem::Mac))?;

        let ip = match fields.get("ip") {
            Some(Value::String(ip)) if addr::is_valid_ipv4(ip) => ip.clone(),
            Some(_) => return Err(entry_error(EntryProblem::Ip)),
            None => DEFAULT_IP.to_string(),
        };

        let port = match fields.get("port") {
            Some(value) => match value.as_i64() {
                Some(port) if addr::is_valid_port(port) => port as u16,
                _ => return Err(entry_error(EntryProblem::Port)),
            },
            None => DEFAULT_PORT,
        };

        Ok(HostRecord { mac, ip, port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> Store {
        Store::new(StoreConfig::in_dir(dir.path()))
    }

    fn read_json(store: &Store) -> serde_json::Value {
        let text = fs::read_to_string(store.path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn mac(text: &str) -> MacAddress {
        text.parse().unwrap()
    }

    #[test]
    fn absent_store_reads_as_empty_registry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.get_names().unwrap().is_empty());
        assert!(store.get_name_record("anything").unwrap().is_none());
    }

    #[test]
    fn save_then_lookup_returns_exactly_what_was_saved() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save_name("office", mac("00:11:22:33:44:55"), "10.0.0.5", 40000)
            .unwrap();

        let record = store.get_name_record("office").unwrap().unwrap();
        assert_eq!(record.mac.octets(), [0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(record.ip, "10.0.0.5");
        assert_eq!(record.port, 40000);

        assert_eq!(
            read_json(&store)["names"]["office"],
            serde_json::json!({"mac": "00:11:22:33:44:55", "ip": "10.0.0.5", "port": 40000})
        );
    }

    #[test]
    fn default_ip_and_port_are_omitted_on_disk_but_returned_on_lookup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store
            .save_name("x", MacAddress::new([1, 1, 1, 1, 1, 1]), DEFAULT_IP, DEFAULT_PORT)
            .unwrap();

        assert_eq!(
            read_json(&store)["names"]["x"],
            serde_json::json!({"mac": "01:01:01:01:01:01"})
        );

        let names = store.get_names().unwrap();
        assert_eq!(names.len(), 1);
        let record = &names["x"];
        assert_eq!(record.mac.octets(), [1, 1, 1, 1, 1, 1]);
        assert_eq!(record.ip, DEFAULT_IP);
        assert_eq!(record.port, DEFAULT_PORT);
    }

    #[test]
    fn save_overwrites_existing_name() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save_name("host", mac("aa:aa:aa:aa:aa:aa"), "10.0.0.1", 7).unwrap();
        store.save_name("host", mac("bb:bb:bb:bb:bb:bb"), DEFAULT_IP, DEFAULT_PORT).unwrap();

        let record = store.get_name_record("host").unwrap().unwrap();
        assert_eq!(record.mac, mac("bb:bb:bb:bb:bb:bb"));
        assert_eq!(record.ip, DEFAULT_IP);
        assert_eq!(record.port, DEFAULT_PORT);
        assert_eq!(
            read_json(&store)["names"]["host"],
            serde_json::json!({"mac": "BB:BB:BB:BB:BB:BB"})
        );
    }

    #[test]
    fn delete_removes_entry_and_keeps_the_rest() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save_name("a", mac("01:01:01:01:01:01"), DEFAULT_IP, DEFAULT_PORT).unwrap();
        store.save_name("b", mac("02:02:02:02:02:02"), DEFAULT_IP, DEFAULT_PORT).unwrap();
        store.delete_name("a").unwrap();

        let names = store.get_names().unwrap();
        assert!(!names.contains_key("a"));
        assert!(names.contains_key("b"));

        // Deleting a name that was never saved changes nothing.
        store.delete_name("ghost").unwrap();
        assert_eq!(store.get_names().unwrap(), names);
    }

    #[test]
    fn delete_of_missing_name_succeeds_and_still_rewrites() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        // The no-op delete persists unconditionally; on a fresh directory
        // that means an empty document appears on disk.
        store.delete_name("ghost").unwrap();

        assert_eq!(read_json(&store), serde_json::json!({"names": {}}));
        assert!(store.get_names().unwrap().is_empty());
    }

    #[test]
    fn malformed_mac_fails_get_names_and_names_the_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(
            store.path(),
            r#"{"names": {
                "good": {"mac": "00:11:22:33:44:55"},
                "bad": {"mac": "not-a-mac"}
            }}"#,
        )
        .unwrap();

        let err = store.get_names().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("`bad`"), "message was: {message}");
        assert!(message.contains(".wakeonlan"), "message was: {message}");

        // Lookup of the well-formed sibling still succeeds.
        assert!(store.get_name_record("good").unwrap().is_some());
    }

    #[test]
    fn missing_mac_is_an_entry_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(store.path(), r#"{"names": {"nomac": {"ip": "10.0.0.1"}}}"#).unwrap();

        let err = store.get_name_record("nomac").unwrap_err();
        assert!(matches!(
            err,
            WolError::MalformedEntry { problem: EntryProblem::Mac, .. }
        ));
    }

    #[test]
    fn malformed_ip_and_port_are_entry_errors() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(
            store.path(),
            r#"{"names": {"badip": {"mac": "00:11:22:33:44:55", "ip": "999.0.0.1"}}}"#,
        )
        .unwrap();
        assert!(matches!(
            store.get_name_record("badip").unwrap_err(),
            WolError::MalformedEntry { problem: EntryProblem::Ip, .. }
        ));

        // 65535 is rejected on load too; the stored bound is exclusive.
        fs::write(
            store.path(),
            r#"{"names": {"badport": {"mac": "00:11:22:33:44:55", "port": 65535}}}"#,
        )
        .unwrap();
        assert!(matches!(
            store.get_name_record("badport").unwrap_err(),
            WolError::MalformedEntry { problem: EntryProblem::Port, .. }
        ));

        fs::write(
            store.path(),
            r#"{"names": {"edge": {"mac": "00:11:22:33:44:55", "port": 65534}}}"#,
        )
        .unwrap();
        assert_eq!(store.get_name_record("edge").unwrap().unwrap().port, 65534);
    }

    #[test]
    fn wrong_typed_fields_still_name_the_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        // A numeric mac is an entry-level problem, not a document one.
        fs::write(store.path(), r#"{"names": {"bad": {"mac": 5}}}"#).unwrap();
        let err = store.get_names().unwrap_err();
        assert!(
            matches!(&err, WolError::MalformedEntry { problem: EntryProblem::Mac, .. }),
            "got: {err}"
        );
        assert!(err.to_string().contains("`bad`"), "message was: {err}");

        fs::write(
            store.path(),
            r#"{"names": {"strport": {"mac": "00:11:22:33:44:55", "port": "9"}}}"#,
        )
        .unwrap();
        assert!(matches!(
            store.get_name_record("strport").unwrap_err(),
            WolError::MalformedEntry { problem: EntryProblem::Port, .. }
        ));

        fs::write(
            store.path(),
            r#"{"names": {"numip": {"mac": "00:11:22:33:44:55", "ip": 7}}}"#,
        )
        .unwrap();
        assert!(matches!(
            store.get_name_record("numip").unwrap_err(),
            WolError::MalformedEntry { problem: EntryProblem::Ip, .. }
        ));
    }

    #[test]
    fn non_object_entry_names_the_entry() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(
            store.path(),
            r#"{"names": {"flat": "00:11:22:33:44:55", "ok": {"mac": "01:01:01:01:01:01"}}}"#,
        )
        .unwrap();

        let err = store.get_name_record("flat").unwrap_err();
        assert!(matches!(
            &err,
            WolError::MalformedEntry { problem: EntryProblem::Record, .. }
        ));
        assert!(err.to_string().contains("`flat`"), "message was: {err}");

        assert!(store.get_name_record("ok").unwrap().is_some());
    }

    #[test]
    fn rewrite_keeps_extra_record_fields_but_canonicalizes_the_top_level() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(
            store.path(),
            r#"{"comment": "hand edited",
                "names": {"kept": {"mac": "01:01:01:01:01:01", "note": "desk machine"}}}"#,
        )
        .unwrap();

        store.save_name("other", mac("02:02:02:02:02:02"), DEFAULT_IP, DEFAULT_PORT).unwrap();

        let document = read_json(&store);
        assert_eq!(document["names"]["kept"]["note"], "desk machine");
        assert!(document.get("comment").is_none(), "document was: {document}");
    }

    #[test]
    fn unparseable_store_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(store.path(), "not json at all").unwrap();
        assert!(matches!(
            store.get_names().unwrap_err(),
            WolError::MalformedStore { .. }
        ));
    }

    #[test]
    fn wrong_top_level_shape_is_malformed() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for body in [r#"[1, 2, 3]"#, r#"{"names": 3}"#, r#"{"records": {}}"#] {
            fs::write(store.path(), body).unwrap();
            assert!(
                matches!(store.get_names().unwrap_err(), WolError::MalformedStore { .. }),
                "accepted {body:?}"
            );
        }
    }

    #[test]
    fn save_refuses_to_overwrite_a_malformed_store() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        fs::write(store.path(), "{broken").unwrap();

        let err = store
            .save_name("x", mac("00:11:22:33:44:55"), DEFAULT_IP, DEFAULT_PORT)
            .unwrap_err();
        assert!(matches!(err, WolError::MalformedStore { .. }));

        // The corrupt file is left as-is for the user to inspect.
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{broken");
    }

    #[test]
    fn store_is_written_with_two_space_indentation() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save_name("x", mac("01:01:01:01:01:01"), DEFAULT_IP, DEFAULT_PORT).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n  \"names\""), "document was: {text}");
        assert!(text.contains("\n    \"x\""), "document was: {text}");
        assert!(!dir.path().join(".wakeonlan.tmp").exists());
    }

    // Known limitation: there is no isolation across load-modify-persist
    // cycles of independent invocations. Two stores that load the same
    // document and then both save will not merge; the later rename wins and
    // the earlier update is lost. This documents the behavior rather than
    // guarding against it.
    #[test]
    fn interleaved_load_persist_cycles_lose_the_earlier_update() {
        let dir = TempDir::new().unwrap();
        let first = store_in(&dir);
        let second = store_in(&dir);

        // Both invocations load before either persists, as two processes
        // racing on the same file would.
        let mut seen_by_first = first.load().unwrap();
        let mut seen_by_second = second.load().unwrap();

        seen_by_first
            .names
            .insert("a".to_string(), serde_json::json!({"mac": "01:01:01:01:01:01"}));
        first.persist(&seen_by_first).unwrap();

        seen_by_second
            .names
            .insert("b".to_string(), serde_json::json!({"mac": "02:02:02:02:02:02"}));
        second.persist(&seen_by_second).unwrap();

        // The later rename wins wholesale; "a" is gone.
        let names = second.get_names().unwrap();
        assert!(!names.contains_key("a"));
        assert!(names.contains_key("b"));
    }
}
