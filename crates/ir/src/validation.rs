//! Validation rules for diagrams and projects
//!
//! Editor commits already reject most bad input. These rules catch what can
//! still arrive from outside: hand-edited files, older backends, or data
//! saved by other clients.

use crate::attribute::Attribute;
use crate::class::ClassNode;
use crate::project::{DiagramSnapshot, Project};
use crate::relationship::{DerivationIssue, derive_edges};
use forge_core::{DataType, ForgeError, ForgeResult};
use std::collections::HashSet;

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of a validation operation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert to ForgeResult (fails if any errors)
    pub fn to_result(self) -> ForgeResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(ForgeError::validation(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// A validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Path to the problematic element (e.g., "classes.User.attributes.email")
    pub path: Option<String>,

    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            suggestion: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

/// Error codes for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    // Class errors
    EmptyClassName,
    DuplicateClassName,
    NoAttributes,

    // Attribute errors
    EmptyAttributeName,
    DuplicateAttributeName,
    PrimaryAndForeign,
    ForeignKeyMissingReference,
    UnresolvedForeignKey,
    EnumNotSelected,

    // Enum errors
    EmptyEnumName,
    DuplicateEnumName,

    // Project errors
    EmptyProjectName,
}

// ============================================================================
// ValidationWarning
// ============================================================================

/// A validation warning (non-fatal issue)
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub code: ValidationWarningCode,
    pub message: String,
    pub path: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: ValidationWarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] Warning: {}", path, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    NoPrimaryKey,
    DanglingEnumReference,
    EmptyEnum,
    StaleEdge,
    MissingEdge,
    ClassModelOutOfSync,
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// A check over a diagram
pub trait ValidationRule {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Get the rule description
    fn description(&self) -> &'static str;

    /// Validate a diagram and return the result
    fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Diagram validator that runs multiple validation rules
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with default rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(ClassNamesRule));
        validator.add_rule(Box::new(ClassAttributesRule));
        validator.add_rule(Box::new(ForeignKeysRule));
        validator.add_rule(Box::new(EnumReferencesRule));
        validator.add_rule(Box::new(EnumsRule));
        validator.add_rule(Box::new(EdgesRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate a diagram with all rules
    pub fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for rule in &self.rules {
            result.merge(rule.validate(diagram));
        }
        result
    }

    /// Validate a project's metadata and its diagram
    pub fn validate_project(&self, project: &Project) -> ValidationResult {
        let mut result = validate_project_meta(project);
        result.merge(self.validate(&project.nodes));
        result
    }

    /// Validate and return Result
    pub fn validate_result(&self, diagram: &DiagramSnapshot) -> ForgeResult<()> {
        self.validate(diagram).to_result()
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

fn class_path(node: &ClassNode) -> String {
    format!("classes.{}", node.data.display_name())
}

fn attribute_path(node: &ClassNode, attribute: &Attribute) -> String {
    format!("{}.attributes.{}", class_path(node), attribute.name)
}

/// Rule: class names are present and unique
pub struct ClassNamesRule;

impl ValidationRule for ClassNamesRule {
    fn name(&self) -> &'static str {
        "class_names"
    }

    fn description(&self) -> &'static str {
        "Validates that class names are present and unique"
    }

    fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen: HashSet<&str> = HashSet::new();

        for node in diagram.nodes.iter() {
            if node.data.name.trim().is_empty() {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::EmptyClassName,
                        "Class name is required",
                    )
                    .with_path(format!("nodes.{}", node.id)),
                );
                continue;
            }

            if !seen.insert(node.data.name.as_str()) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateClassName,
                        format!("Duplicate class name: '{}'", node.data.name),
                    )
                    .with_path(class_path(node))
                    .with_suggestion("Foreign keys resolve to the first class with this name"),
                );
            }
        }

        result
    }
}

/// Rule: attribute lists are well formed
pub struct ClassAttributesRule;

impl ValidationRule for ClassAttributesRule {
    fn name(&self) -> &'static str {
        "class_attributes"
    }

    fn description(&self) -> &'static str {
        "Validates attribute names, key flags and foreign-key declarations"
    }

    fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for node in diagram.nodes.iter() {
            let path = class_path(node);

            if node.data.attributes.is_empty() {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::NoAttributes,
                        format!("Class '{}' has no attributes", node.data.display_name()),
                    )
                    .with_path(&path),
                );
                continue;
            }

            if !node.data.attributes.iter().any(|a| a.is_primary) {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::NoPrimaryKey,
                        format!("Class '{}' has no primary key", node.data.display_name()),
                    )
                    .with_path(&path),
                );
            }

            let mut seen: HashSet<&str> = HashSet::new();
            for attribute in &node.data.attributes {
                if attribute.name.is_empty() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::EmptyAttributeName,
                            "Attribute name is required",
                        )
                        .with_path(&path),
                    );
                    continue;
                }

                let attr_path = attribute_path(node, attribute);

                if !seen.insert(attribute.name.as_str()) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::DuplicateAttributeName,
                            format!("Duplicate attribute name: '{}'", attribute.name),
                        )
                        .with_path(&attr_path),
                    );
                }

                if attribute.is_primary && attribute.is_foreign {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::PrimaryAndForeign,
                            "An attribute cannot be both primary and foreign key",
                        )
                        .with_path(&attr_path),
                    );
                }

                if attribute.is_foreign && attribute.foreign_key_class.is_none() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::ForeignKeyMissingReference,
                            format!("Foreign key '{}' has no reference", attribute.name),
                        )
                        .with_path(&attr_path)
                        .with_suggestion("Pick a target as Class.attribute"),
                    );
                }
            }
        }

        result
    }
}

/// Rule: every foreign key resolves to an existing class attribute
pub struct ForeignKeysRule;

impl ValidationRule for ForeignKeysRule {
    fn name(&self) -> &'static str {
        "foreign_keys"
    }

    fn description(&self) -> &'static str {
        "Validates that foreign keys reference existing classes and attributes"
    }

    fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for issue in derive_edges(&diagram.nodes).issues {
            let path = format!("classes.{}", issue.location().replacen('.', ".attributes.", 1));
            let suggestion = match &issue {
                DerivationIssue::TargetClassNotFound { .. } => "Create the class or fix the name",
                DerivationIssue::TargetAttributeNotFound { .. } => {
                    "Add the attribute to the target class"
                }
            };
            result.add_error(
                ValidationError::new(ValidationErrorCode::UnresolvedForeignKey, issue.to_string())
                    .with_path(path)
                    .with_suggestion(suggestion),
            );
        }

        result
    }
}

/// Rule: ENUM attributes point at defined enums
pub struct EnumReferencesRule;

impl ValidationRule for EnumReferencesRule {
    fn name(&self) -> &'static str {
        "enum_references"
    }

    fn description(&self) -> &'static str {
        "Validates that ENUM attributes reference defined enums"
    }

    fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for node in diagram.nodes.iter() {
            for attribute in &node.data.attributes {
                match (&attribute.data_type, attribute.enum_name.as_deref()) {
                    (DataType::Enum, None) => result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::EnumNotSelected,
                            "Enum type is required",
                        )
                        .with_path(attribute_path(node, attribute)),
                    ),
                    (_, Some(name)) if !diagram.enums.contains(name) => result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::DanglingEnumReference,
                            format!("Enum '{}' is not defined", name),
                        )
                        .with_path(attribute_path(node, attribute)),
                    ),
                    _ => {}
                }
            }
        }

        result
    }
}

/// Rule: enum definitions are named, unique and non-empty
pub struct EnumsRule;

impl ValidationRule for EnumsRule {
    fn name(&self) -> &'static str {
        "enums"
    }

    fn description(&self) -> &'static str {
        "Validates enum names and values"
    }

    fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen: HashSet<&str> = HashSet::new();

        for enum_type in diagram.enums.iter() {
            if enum_type.name.is_empty() {
                result.add_error(
                    ValidationError::new(ValidationErrorCode::EmptyEnumName, "Enum name is required")
                        .with_path("enums"),
                );
                continue;
            }

            let path = format!("enums.{}", enum_type.name);
            if !seen.insert(enum_type.name.as_str()) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateEnumName,
                        format!("Duplicate enum name: '{}'", enum_type.name),
                    )
                    .with_path(&path),
                );
            }

            if !enum_type.values.iter().any(|v| v.is_complete()) {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::EmptyEnum,
                        format!("Enum '{}' has no values", enum_type.name),
                    )
                    .with_path(&path),
                );
            }
        }

        result
    }
}

/// Rule: stored edges match the edges implied by the foreign keys
pub struct EdgesRule;

impl ValidationRule for EdgesRule {
    fn name(&self) -> &'static str {
        "edges"
    }

    fn description(&self) -> &'static str {
        "Compares stored edges against the edges derived from foreign keys"
    }

    fn validate(&self, diagram: &DiagramSnapshot) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let derived = derive_edges(&diagram.nodes);

        for edge in &diagram.edges {
            if !derived.has_edge(&edge.id) {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::StaleEdge,
                        format!("Stored edge '{}' has no matching foreign key", edge.id),
                    )
                    .with_path("edges"),
                );
            }
        }

        for edge in &derived.edges {
            if !diagram.edges.iter().any(|e| e.id == edge.id) {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::MissingEdge,
                        format!("Edge '{}' is missing from the stored edges", edge.label),
                    )
                    .with_path("edges"),
                );
            }
        }

        result
    }
}

/// Checks on the project record itself
pub fn validate_project_meta(project: &Project) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if project.name.trim().is_empty() {
        result.add_error(
            ValidationError::new(
                ValidationErrorCode::EmptyProjectName,
                "Project name is required",
            )
            .with_path("name"),
        );
    }

    if project.class_model != project.nodes.nodes.class_model() {
        result.add_warning(
            ValidationWarning::new(
                ValidationWarningCode::ClassModelOutOfSync,
                "class_model does not match the diagram; it is rebuilt on save",
            )
            .with_path("class_model"),
        );
    }

    result
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ClassData, ClassRegistry};
    use crate::enums::{EnumRegistry, EnumType};
    use forge_core::{NodeId, Position};

    fn node(id: &str, data: ClassData) -> ClassNode {
        ClassNode::new(NodeId::new(id), Position::zero(), data)
    }

    fn diagram(nodes: Vec<ClassNode>) -> DiagramSnapshot {
        let nodes = ClassRegistry::from_nodes(nodes);
        let edges = derive_edges(&nodes).edges;
        DiagramSnapshot {
            nodes,
            edges,
            enums: EnumRegistry::new(),
        }
    }

    fn valid_diagram() -> DiagramSnapshot {
        diagram(vec![
            node(
                "u",
                ClassData::new("User").with_attribute(Attribute::primary_key("id")),
            ),
            node(
                "o",
                ClassData::new("Order")
                    .with_attribute(Attribute::primary_key("id"))
                    .with_attribute(Attribute::foreign_key("user_id", "User", "id")),
            ),
        ])
    }

    #[test]
    fn test_valid_diagram() {
        let result = Validator::with_default_rules().validate(&valid_diagram());
        assert!(result.valid, "errors: {:?}", result.errors);
        assert!(!result.has_warnings(), "warnings: {:?}", result.warnings);
    }

    #[test]
    fn test_duplicate_and_empty_class_names() {
        let d = diagram(vec![
            node("a", ClassData::new("User").with_attribute(Attribute::primary_key("id"))),
            node("b", ClassData::new("User").with_attribute(Attribute::primary_key("id"))),
            node("c", ClassData::new("").with_attribute(Attribute::primary_key("id"))),
        ]);

        let result = ClassNamesRule.validate(&d);
        let codes: Vec<_> = result.errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&ValidationErrorCode::DuplicateClassName));
        assert!(codes.contains(&ValidationErrorCode::EmptyClassName));
    }

    #[test]
    fn test_class_without_attributes() {
        let d = diagram(vec![node("a", ClassData::new("Empty"))]);
        let result = ClassAttributesRule.validate(&d);
        assert_eq!(result.errors[0].code, ValidationErrorCode::NoAttributes);
    }

    #[test]
    fn test_unresolved_foreign_key() {
        let d = diagram(vec![node(
            "o",
            ClassData::new("Order")
                .with_attribute(Attribute::primary_key("id"))
                .with_attribute(Attribute::foreign_key("user_id", "User", "id")),
        )]);

        let result = ForeignKeysRule.validate(&d);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0].path.as_deref(),
            Some("classes.Order.attributes.user_id")
        );
        assert_eq!(result.errors[0].message, "Target class \"User\" not found");
    }

    #[test]
    fn test_dangling_enum_is_a_warning() {
        let mut d = diagram(vec![node(
            "u",
            ClassData::new("User")
                .with_attribute(Attribute::primary_key("id"))
                .with_attribute(Attribute::enumeration("role", "Role")),
        )]);

        let result = EnumReferencesRule.validate(&d);
        assert!(result.valid);
        assert_eq!(
            result.warnings[0].code,
            ValidationWarningCode::DanglingEnumReference
        );

        d.enums.push(EnumType::new("Role").with_value("ADMIN", "admin"));
        assert!(!EnumReferencesRule.validate(&d).has_warnings());
    }

    #[test]
    fn test_duplicate_enum() {
        let mut d = valid_diagram();
        d.enums.push(EnumType::new("Role").with_value("A", "a"));
        d.enums.push(EnumType::new("Role").with_value("B", "b"));

        let result = EnumsRule.validate(&d);
        assert_eq!(result.errors[0].code, ValidationErrorCode::DuplicateEnumName);
    }

    #[test]
    fn test_stale_and_missing_edges() {
        let mut d = valid_diagram();
        let mut stale = d.edges[0].clone();
        stale.id = "edge-x-y-z".to_string();
        d.edges = vec![stale];

        let result = EdgesRule.validate(&d);
        let codes: Vec<_> = result.warnings.iter().map(|w| w.code).collect();
        assert_eq!(
            codes,
            vec![ValidationWarningCode::StaleEdge, ValidationWarningCode::MissingEdge]
        );
    }

    #[test]
    fn test_project_meta() {
        let mut project = Project::new("");
        project.nodes = valid_diagram();

        let result = Validator::with_default_rules().validate_project(&project);
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, ValidationErrorCode::EmptyProjectName);
        assert_eq!(
            result.warnings[0].code,
            ValidationWarningCode::ClassModelOutOfSync
        );
    }

    #[test]
    fn test_to_result_joins_messages() {
        let d = diagram(vec![node("a", ClassData::new("Empty"))]);
        let err = Validator::with_default_rules()
            .validate_result(&d)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("has no attributes"));
    }
}
