//! Request paths of the deploy API, relative to the instance base URL.
//!
//! Keys, secret names and relative file paths are percent-encoded per
//! segment. Slashes inside a relative file path are kept as separators.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

use crate::types::DeployKey;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const DEPLOY_ROOT: &str = "/cvmrk/cli/deploy";

fn segment(s: &str) -> String {
    utf8_percent_encode(s, SEGMENT).to_string()
}

fn rel_path(path: &str) -> String {
    path.split('/').map(segment).collect::<Vec<_>>().join("/")
}

fn under_key(key: &DeployKey, rest: &str) -> String {
    format!("{DEPLOY_ROOT}/{}/{rest}", segment(key.as_str()))
}

/// `GET`: the currently active deploy key.
pub fn active_key() -> String {
    DEPLOY_ROOT.to_string()
}

/// `GET`: JSON list of all deployments.
pub fn deploy_list() -> String {
    "/deploy/list".to_string()
}

/// `POST`: starts a deployment.
pub fn begin(key: &DeployKey) -> String {
    under_key(key, "begin")
}

/// `PUT`: uploads one secret.
pub fn secret(key: &DeployKey, name: &str) -> String {
    under_key(key, &format!("secret/{}", segment(name)))
}

/// `PUT`: uploads the function bundle.
pub fn function(key: &DeployKey) -> String {
    under_key(key, "function")
}

/// `PUT`: uploads one resource file.
pub fn resource(key: &DeployKey, relative_path: &str) -> String {
    under_key(key, &format!("resource/{}", rel_path(relative_path)))
}

/// `PUT`: uploads one static file.
pub fn static_file(key: &DeployKey, relative_path: &str) -> String {
    under_key(key, &format!("static/{}", rel_path(relative_path)))
}

/// `POST`: makes the deployment live.
pub fn activate(key: &DeployKey) -> String {
    under_key(key, "activate")
}
