//! Predicates that classify a cursor position within a resource manifest.
//!
//! Most predicates ask whether the position lies at or below a well-known
//! part of a manifest, such as a container spec or the labels of a resource.
//! Key scalars are never inside a section.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::cursor::Cursor;
use crate::document::node::Document;
use crate::yamlpath::{Anchor, Matcher, PathSegment, YamlPath};

fn constant(expression: &str) -> Matcher {
    Matcher::compile(expression).expect("constant path expression")
}

static METADATA: Lazy<Matcher> = Lazy::new(|| constant("$.metadata"));
static LABELS: Lazy<Matcher> = Lazy::new(|| constant("..metadata.labels.*"));
static ANNOTATIONS: Lazy<Matcher> = Lazy::new(|| constant("..metadata.annotations.*"));
static CONTAINER_SPEC: Lazy<Matcher> = Lazy::new(|| constant("$..spec.containers[*].*"));
static INIT_CONTAINER_SPEC: Lazy<Matcher> =
    Lazy::new(|| constant("$..spec.initContainers[*].*"));
static RESOURCES: Lazy<Matcher> = Lazy::new(|| constant("$..spec.containers[*].resources"));
static SERVICE_SPEC: Lazy<Matcher> = Lazy::new(|| constant("$.spec"));
static TLS_HOSTS: Lazy<Matcher> = Lazy::new(|| constant("$.spec.tls[*].hosts"));
static ALLOW_HTTP: Lazy<Matcher> =
    Lazy::new(|| constant("$.metadata.annotations['kubernetes.io/ingress.allow-http']"));
static RULES: Lazy<Matcher> = Lazy::new(|| constant("$.rules"));

/// A region of a resource manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Anywhere in a document with both `apiVersion` and `kind`.
    Resource,
    Metadata,
    Annotations,
    Labels,
    Containers,
    InitContainers,
    ResourceLimits,
    /// The spec of a `Service`.
    Service,
    /// Anywhere in an `Ingress`.
    Ingress,
    /// The rules of a role.
    Rbac,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Resource,
        Section::Metadata,
        Section::Annotations,
        Section::Labels,
        Section::Containers,
        Section::InitContainers,
        Section::ResourceLimits,
        Section::Service,
        Section::Ingress,
        Section::Rbac,
    ];

    /// Returns true if the cursor's position lies in this section.
    pub fn contains(&self, cursor: &Cursor<'_>) -> bool {
        match self {
            Section::Resource => is_resource(cursor.document()),
            Section::Metadata => !cursor.is_key() && METADATA.matches_within(cursor),
            Section::Annotations => in_annotations(cursor),
            Section::Labels => in_labels(cursor),
            Section::Containers => in_container_spec(cursor),
            Section::InitContainers => in_init_container_spec(cursor),
            Section::ResourceLimits => in_resources(cursor),
            Section::Service => in_service(cursor) && in_service_spec(cursor),
            Section::Ingress => in_kind("Ingress", cursor),
            Section::Rbac => in_rules(cursor),
        }
    }

    /// Every section containing the cursor's position.
    pub fn at(cursor: &Cursor<'_>) -> Vec<Section> {
        Section::ALL
            .into_iter()
            .filter(|s| s.contains(cursor))
            .collect()
    }
}

fn body_scalar<'a>(document: &'a Document, key: &str) -> Option<&'a str> {
    document.block().as_mapping().and_then(|m| m.scalar(key))
}

/// True if the document body declares both `apiVersion` and `kind`.
pub fn is_resource(document: &Document) -> bool {
    body_scalar(document, "apiVersion").is_some() && body_scalar(document, "kind").is_some()
}

/// True if the cursor's document declares `kind`.
pub fn in_kind(kind: &str, cursor: &Cursor<'_>) -> bool {
    body_scalar(cursor.document(), "kind") == Some(kind)
}

pub fn in_pod(cursor: &Cursor<'_>) -> bool {
    in_kind("Pod", cursor)
}

pub fn in_deployment(cursor: &Cursor<'_>) -> bool {
    in_kind("Deployment", cursor)
}

pub fn in_daemon_set(cursor: &Cursor<'_>) -> bool {
    in_kind("DaemonSet", cursor)
}

pub fn in_stateful_set(cursor: &Cursor<'_>) -> bool {
    in_kind("StatefulSet", cursor)
}

pub fn in_service(cursor: &Cursor<'_>) -> bool {
    in_kind("Service", cursor)
}

/// True if the position is the top-level `metadata` entry or its value.
pub fn is_metadata(cursor: &Cursor<'_>) -> bool {
    METADATA.matches(cursor)
}

/// True inside a `metadata.labels` entry, at any nesting depth.
pub fn in_labels(cursor: &Cursor<'_>) -> bool {
    LABELS.matches_within(cursor)
}

pub fn in_annotations(cursor: &Cursor<'_>) -> bool {
    ANNOTATIONS.matches_within(cursor)
}

/// True inside any entry of a container in `spec.containers`, including the
/// pod templates of workload resources.
pub fn in_container_spec(cursor: &Cursor<'_>) -> bool {
    CONTAINER_SPEC.matches_within(cursor)
}

pub fn in_init_container_spec(cursor: &Cursor<'_>) -> bool {
    INIT_CONTAINER_SPEC.matches_within(cursor)
}

/// True if the position is at or below an `image` entry.
pub fn is_image_name(cursor: &Cursor<'_>) -> bool {
    has_enclosing_key("image", cursor)
}

/// True inside the `resources` block of a container.
pub fn in_resources(cursor: &Cursor<'_>) -> bool {
    RESOURCES.matches_within(cursor)
}

/// True inside `resources.limits.<resource_type>` of a container.
pub fn in_limits(resource_type: &str, cursor: &Cursor<'_>) -> bool {
    resource_matcher("limits", resource_type).matches_within(cursor)
}

/// True inside `resources.requests.<resource_type>` of a container.
pub fn in_requests(resource_type: &str, cursor: &Cursor<'_>) -> bool {
    resource_matcher("requests", resource_type).matches_within(cursor)
}

fn resource_matcher(kind: &str, resource_type: &str) -> Matcher {
    let mut path = RESOURCES.path().clone();
    path.segments.push(PathSegment::Child(kind.to_string()));
    path.segments.push(PathSegment::Child(resource_type.to_string()));
    Matcher::from_path(path)
}

/// Finds `<field>.<resource_type>` below a container's `resources` entry,
/// where `field` is `limits` or `requests`. The resource type is one key, so
/// names such as `nvidia.com/gpu` are taken literally.
pub fn resource_value_matcher(field: &str, resource_type: &str) -> Matcher {
    Matcher::from_path(YamlPath::new(
        Anchor::Relative,
        vec![
            PathSegment::Child(field.to_string()),
            PathSegment::Child(resource_type.to_string()),
        ],
    ))
}

/// True inside the top-level `spec` of a document.
pub fn in_service_spec(cursor: &Cursor<'_>) -> bool {
    SERVICE_SPEC.matches_within(cursor)
}

pub fn in_external_ips(cursor: &Cursor<'_>) -> bool {
    has_enclosing_key("externalIPs", cursor)
}

/// The service type declared by a document's `spec`, `ClusterIP` when the
/// spec leaves it out. `None` if the document has no `spec` mapping.
pub fn service_type(document: &Document) -> Option<&str> {
    let spec = document
        .block()
        .as_mapping()?
        .get("spec")?
        .value()
        .as_mapping()?;
    Some(spec.scalar("type").unwrap_or("ClusterIP"))
}

/// True if the document names at least one TLS host list.
pub fn is_tls_configured(cursor: &Cursor<'_>) -> bool {
    !TLS_HOSTS.find(cursor).is_empty()
}

/// True if the document's `kubernetes.io/ingress.allow-http` annotation is
/// `"false"`.
pub fn is_disallow_http_configured(cursor: &Cursor<'_>) -> bool {
    ALLOW_HTTP
        .find_first(cursor)
        .and_then(|n| n.scalar_value())
        == Some("false")
}

/// True inside the top-level `rules` of a document.
pub fn in_rules(cursor: &Cursor<'_>) -> bool {
    RULES.matches_within(cursor)
}

/// True if the position is in the label `name` and its value matches
/// `regex` in full.
pub fn label_value_matches(name: &str, regex: &Regex, cursor: &Cursor<'_>) -> bool {
    in_labels(cursor) && entry_value_matches(name, regex, cursor)
}

/// True if the position is in the annotation `name` and its value matches
/// `regex` in full.
pub fn annotation_value_matches(name: &str, regex: &Regex, cursor: &Cursor<'_>) -> bool {
    in_annotations(cursor) && entry_value_matches(name, regex, cursor)
}

fn entry_value_matches(name: &str, regex: &Regex, cursor: &Cursor<'_>) -> bool {
    let Some(entry) = cursor.first_enclosing_entry() else {
        return false;
    };
    if entry.key().value() != name {
        return false;
    }
    match entry.value().as_scalar() {
        Some(s) => is_full_match(regex, s.value()),
        None => false,
    }
}

fn is_full_match(regex: &Regex, text: &str) -> bool {
    regex
        .find(text)
        .map_or(false, |m| m.start() == 0 && m.end() == text.len())
}

fn has_enclosing_key(key: &str, cursor: &Cursor<'_>) -> bool {
    !cursor.is_key() && cursor.entry_keys().contains(&key)
}
