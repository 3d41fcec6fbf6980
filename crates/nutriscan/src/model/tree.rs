use super::{argmax, ensure_classes, ClassLabel, Classifier, ModelValidationError, RawPrediction};
use crate::nutrients::{FeatureRow, FEATURE_COUNT};
use serde::Deserialize;

/// A node of a binary decision tree. Rows with `row[feature] <= threshold`
/// go left.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// Node table of a single tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeDocument {
    pub nodes: Vec<TreeNode>,
}

/// Children must point strictly forward, which rules out cycles.
fn validate_nodes(
    nodes: &[TreeNode],
    tree: usize,
    class_count: usize,
) -> Result<(), ModelValidationError> {
    let invalid = |node: usize, detail: String| ModelValidationError::Tree { tree, node, detail };

    if nodes.is_empty() {
        return Err(invalid(0, "tree has no nodes".to_string()));
    }

    for (index, node) in nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                left,
                right,
                ..
            } => {
                if *feature >= FEATURE_COUNT {
                    return Err(invalid(
                        index,
                        format!("feature index {feature} out of range"),
                    ));
                }
                for child in [*left, *right] {
                    if child <= index || child >= nodes.len() {
                        return Err(invalid(
                            index,
                            format!("child {child} is not a forward node"),
                        ));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if value.len() != class_count {
                    return Err(invalid(
                        index,
                        format!(
                            "leaf holds {} values but the model has {class_count} classes",
                            value.len()
                        ),
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Walks a validated node table down to a leaf distribution.
fn leaf<'a>(nodes: &'a [TreeNode], row: &FeatureRow) -> &'a [f64] {
    let mut index = 0;
    loop {
        match &nodes[index] {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                index = if row[*feature] <= *threshold {
                    *left
                } else {
                    *right
                };
            }
            TreeNode::Leaf { value } => return value,
        }
    }
}

/// Single decision tree; leaves carry per-class sample counts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecisionTree {
    pub classes: Vec<ClassLabel>,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_classes(&self.classes)?;
        validate_nodes(&self.nodes, 0, self.classes.len())
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, rows: &[FeatureRow]) -> RawPrediction {
        RawPrediction::Batch(
            rows.iter()
                .map(|row| self.classes[argmax(leaf(&self.nodes, row))].clone())
                .collect(),
        )
    }
}

/// Forest averaging each tree's normalized leaf distribution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<ClassLabel>,
    pub trees: Vec<TreeDocument>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        ensure_classes(&self.classes)?;
        if self.trees.is_empty() {
            return Err(ModelValidationError::Shape(
                "random forest has no trees".to_string(),
            ));
        }
        for (index, tree) in self.trees.iter().enumerate() {
            validate_nodes(&tree.nodes, index, self.classes.len())?;
        }
        Ok(())
    }

    fn probabilities(&self, row: &FeatureRow) -> Vec<f64> {
        let mut totals = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let distribution = leaf(&tree.nodes, row);
            let sum: f64 = distribution.iter().sum();
            for (total, count) in totals.iter_mut().zip(distribution) {
                *total += if sum > 0.0 { count / sum } else { 0.0 };
            }
        }
        let tree_count = self.trees.len() as f64;
        totals.iter().map(|total| total / tree_count).collect()
    }
}

impl Classifier for RandomForest {
    fn predict(&self, rows: &[FeatureRow]) -> RawPrediction {
        RawPrediction::Batch(
            rows.iter()
                .map(|row| self.classes[argmax(&self.probabilities(row))].clone())
                .collect(),
        )
    }
}
