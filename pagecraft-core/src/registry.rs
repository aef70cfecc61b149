// Pagecraft - A block-based page editor built with Rust
// Copyright (C) 2025 Pagecraft Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::models::block::BlockType;
use crate::models::content::BlockContent;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Trait for the per-type knowledge the insert menu needs
pub trait BlockHandler: Send + Sync {
    /// Get the block type this handler manages
    fn block_type(&self) -> BlockType;

    /// Menu label
    fn label(&self) -> &'static str;

    fn description(&self) -> &'static str {
        ""
    }

    /// Canned payload inserted when the template is picked
    fn template_content(&self) -> Value;
}

/// Handler backed by a static template
pub struct TemplateBlock {
    block_type: BlockType,
    label: &'static str,
    description: &'static str,
    template: fn() -> Value,
}

impl TemplateBlock {
    pub fn new(
        block_type: BlockType,
        label: &'static str,
        description: &'static str,
        template: fn() -> Value,
    ) -> Self {
        Self {
            block_type,
            label,
            description,
            template,
        }
    }
}

impl BlockHandler for TemplateBlock {
    fn block_type(&self) -> BlockType {
        self.block_type
    }

    fn label(&self) -> &'static str {
        self.label
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn template_content(&self) -> Value {
        (self.template)()
    }
}

/// One entry of the insert menu catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockTemplate {
    pub block_type: BlockType,
    pub label: &'static str,
    pub description: &'static str,
    pub content: Value,
}

/// Registry for block handlers
pub struct BlockRegistry {
    handlers: HashMap<BlockType, Arc<dyn BlockHandler>>,
}

impl BlockRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a block handler, replacing any previous one for the type
    pub fn register<H: BlockHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.block_type(), Arc::new(handler));
    }

    pub fn get_handler(&self, block_type: BlockType) -> Option<Arc<dyn BlockHandler>> {
        self.handlers.get(&block_type).cloned()
    }

    /// Templates in menu order
    pub fn catalog(&self) -> Vec<BlockTemplate> {
        BlockType::ALL
            .into_iter()
            .filter_map(|block_type| self.handlers.get(&block_type))
            .map(|handler| BlockTemplate {
                block_type: handler.block_type(),
                label: handler.label(),
                description: handler.description(),
                content: handler.template_content(),
            })
            .collect()
    }

    /// Canned content for a type; the empty payload when nothing is registered
    pub fn template(&self, block_type: BlockType) -> BlockContent {
        match self.get_handler(block_type) {
            Some(handler) => BlockContent::from_value(block_type.as_str(), handler.template_content()),
            None => BlockContent::empty(block_type),
        }
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn text_template() -> Value {
    json!("Start writing here. Describe your course, program or announcement.")
}

fn hero_template() -> Value {
    json!({
        "title": "Learn at your own pace",
        "subtitle": "Expert-led courses with hands-on projects and certificates.",
        "buttonText": "Browse courses",
        "buttonLink": "/courses"
    })
}

fn features_template() -> Value {
    json!({
        "title": "Why learners choose us",
        "items": [
            {"title": "Self-paced", "description": "Start any time and learn on your own schedule."},
            {"title": "Hands-on", "description": "Every module ends with a practical project."},
            {"title": "Certified", "description": "Earn a certificate when you complete a course."}
        ]
    })
}

fn cta_template() -> Value {
    json!({
        "title": "Ready to get started?",
        "description": "Join thousands of learners today.",
        "buttonText": "Sign up",
        "buttonLink": "/signup"
    })
}

fn testimonials_template() -> Value {
    json!({
        "title": "What our students say",
        "items": [
            {"quote": "The projects made everything click.", "author": "Sam Rivera", "role": "Student"},
            {"quote": "Clear lessons and great support.", "author": "Alex Chen", "role": "Career changer"}
        ]
    })
}

fn faq_template() -> Value {
    json!({
        "title": "Frequently asked questions",
        "items": [
            {"question": "How long do I have access?", "answer": "Enrolled courses stay available for life."},
            {"question": "Can I get a refund?", "answer": "Yes, within 30 days of purchase."}
        ]
    })
}

fn pricing_template() -> Value {
    json!({
        "title": "Simple pricing",
        "plans": [
            {"name": "Starter", "price": "$0", "features": ["3 free courses", "Community forum"]},
            {"name": "Pro", "price": "$29/mo", "features": ["All courses", "Certificates", "Mentor sessions"]}
        ]
    })
}

fn contact_template() -> Value {
    json!({
        "title": "Get in touch",
        "email": "hello@example.com",
        "phone": "+1 555 0100",
        "address": "123 Learning Lane"
    })
}

fn custom_template() -> Value {
    json!("")
}

/// Create a registry with every built-in block type
pub fn create_default_registry() -> BlockRegistry {
    let mut registry = BlockRegistry::new();

    let templates = [
        TemplateBlock {
            block_type: BlockType::Text,
            label: "Text",
            description: "A paragraph of plain text",
            template: text_template,
        },
        TemplateBlock {
            block_type: BlockType::Hero,
            label: "Hero",
            description: "Large banner with headline and call to action",
            template: hero_template,
        },
        TemplateBlock {
            block_type: BlockType::Features,
            label: "Features",
            description: "Grid of feature highlights",
            template: features_template,
        },
        TemplateBlock {
            block_type: BlockType::Cta,
            label: "Call to action",
            description: "Prompt visitors to take the next step",
            template: cta_template,
        },
        TemplateBlock {
            block_type: BlockType::Testimonials,
            label: "Testimonials",
            description: "Quotes from learners",
            template: testimonials_template,
        },
        TemplateBlock {
            block_type: BlockType::Faq,
            label: "FAQ",
            description: "Questions and answers",
            template: faq_template,
        },
        TemplateBlock {
            block_type: BlockType::Pricing,
            label: "Pricing",
            description: "Plans and prices",
            template: pricing_template,
        },
        TemplateBlock {
            block_type: BlockType::Contact,
            label: "Contact",
            description: "Contact details",
            template: contact_template,
        },
        TemplateBlock {
            block_type: BlockType::Custom,
            label: "Custom",
            description: "Free-form text or JSON",
            template: custom_template,
        },
    ];

    for template in templates {
        registry.register(template);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_registry_covers_every_type() {
        let registry = create_default_registry();
        let catalog = registry.catalog();
        assert_eq!(catalog.len(), BlockType::ALL.len());

        let types: Vec<BlockType> = catalog.iter().map(|t| t.block_type).collect();
        assert_eq!(types, BlockType::ALL.to_vec());
    }

    #[test]
    fn test_templates_decode_to_their_type() {
        let registry = create_default_registry();
        for block_type in BlockType::ALL {
            let content = registry.template(block_type);
            assert_eq!(content.block_type(), Some(block_type), "{}", block_type);
        }
    }

    #[test]
    fn test_template_content_is_verbatim() {
        let registry = create_default_registry();
        let BlockContent::Features(features) = registry.template(BlockType::Features) else {
            panic!("expected features");
        };
        assert_eq!(features.items.len(), 3);
        assert_eq!(features.items[0].title, "Self-paced");
        assert_eq!(registry.template(BlockType::Features).to_value(), features_template());
    }

    #[test]
    fn test_empty_registry_falls_back() {
        let registry = BlockRegistry::new();
        assert!(registry.catalog().is_empty());
        assert_eq!(
            registry.template(BlockType::Faq),
            BlockContent::empty(BlockType::Faq)
        );
    }

    #[test]
    fn test_register_replaces_handler() {
        let mut registry = create_default_registry();
        registry.register(TemplateBlock::new(BlockType::Text, "Note", "", || json!("A note")));

        assert_eq!(registry.template(BlockType::Text), BlockContent::Text("A note".to_string()));
        assert_eq!(registry.get_handler(BlockType::Text).unwrap().label(), "Note");
    }
}
