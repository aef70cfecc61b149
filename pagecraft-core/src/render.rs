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

use crate::models::block::PageBlock;
use crate::models::content::{
    BlockContent, ContactContent, CtaContent, FaqContent, FeaturesContent, HeroContent,
    PricingContent, TestimonialsContent,
};
use crate::models::page::SitePage;
use serde_json::Value;

/// Escape text for inclusion in HTML bodies and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Inline style carrying the block's width and height, if any
pub fn block_style(block: &PageBlock) -> Option<String> {
    let mut rules = Vec::new();
    if let Some(width) = &block.width {
        rules.push(format!("width: {}", width));
    }
    if let Some(height) = &block.height {
        rules.push(format!("height: {}", height));
    }
    if rules.is_empty() {
        None
    } else {
        Some(rules.join("; "))
    }
}

/// Render a block with its layout and dimensions applied
pub fn render_block(block: &PageBlock) -> String {
    let style = block_style(block)
        .map(|s| format!(r#" style="{}""#, escape_html(&s)))
        .unwrap_or_default();

    format!(
        r#"<section class="block block-{} layout-{}" data-block-id="{}"{}>{}</section>"#,
        escape_html(block.type_name()),
        escape_html(block.layout.as_str()),
        escape_html(&block.id),
        style,
        render_content(&block.content, block.layout.columns())
    )
}

/// Render all blocks of a page in order
pub fn render_page(page: &SitePage) -> String {
    let mut html = format!(
        r#"<article class="page" data-page-id="{}">
<h1 class="page-title">{}</h1>"#,
        escape_html(&page.id),
        escape_html(&page.title)
    );
    for block in page.blocks() {
        html.push('\n');
        html.push_str(&render_block(block));
    }
    html.push_str("\n</article>");
    html
}

/// Render a payload; `columns` sets the grid width of item lists
pub fn render_content(content: &BlockContent, columns: usize) -> String {
    match content {
        BlockContent::Text(text) => {
            format!(r#"<div class="text-block">{}</div>"#, escape_html(text))
        }
        BlockContent::Hero(hero) => render_hero(hero),
        BlockContent::Cta(cta) => render_cta(cta),
        BlockContent::Features(features) => render_features(features, columns),
        BlockContent::Testimonials(testimonials) => render_testimonials(testimonials, columns),
        BlockContent::Faq(faq) => render_faq(faq),
        BlockContent::Pricing(pricing) => render_pricing(pricing, columns),
        BlockContent::Contact(contact) => render_contact(contact),
        BlockContent::Custom(Value::String(text)) => {
            format!(r#"<div class="custom-block">{}</div>"#, escape_html(text))
        }
        BlockContent::Custom(value) => raw_dump("custom-block", "custom", value),
        BlockContent::Unknown { type_name, raw } => raw_dump("unknown-block", type_name, raw),
    }
}

fn raw_dump(class: &str, type_name: &str, value: &Value) -> String {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    format!(
        r#"<pre class="{}" data-type="{}">{}</pre>"#,
        class,
        escape_html(type_name),
        escape_html(&json)
    )
}

fn heading(level: u8, text: &str) -> String {
    if text.trim().is_empty() {
        String::new()
    } else {
        format!("\n    <h{level}>{}</h{level}>", escape_html(text))
    }
}

fn button(text: &str, link: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let href = if link.trim().is_empty() { "#" } else { link };
    format!(
        r#"
    <a class="button" href="{}">{}</a>"#,
        escape_html(href),
        escape_html(text)
    )
}

fn grid_open(class: &str, columns: usize) -> String {
    format!(
        r#"
    <div class="{} grid grid-cols-{}">"#,
        class,
        columns.max(1)
    )
}

fn render_hero(hero: &HeroContent) -> String {
    match hero {
        HeroContent::Headline(headline) => format!(
            r#"<div class="hero-block">
    <h1>{}</h1>
</div>"#,
            escape_html(headline)
        ),
        HeroContent::Banner(banner) => {
            let mut html = String::from(r#"<div class="hero-block">"#);
            html.push_str(&heading(1, &banner.title));
            if !banner.subtitle.trim().is_empty() {
                html.push_str(&format!(
                    r#"
    <p class="subtitle">{}</p>"#,
                    escape_html(&banner.subtitle)
                ));
            }
            html.push_str(&button(&banner.button_text, &banner.button_link));
            html.push_str("\n</div>");
            html
        }
    }
}

fn render_cta(cta: &CtaContent) -> String {
    let mut html = String::from(r#"<div class="cta-block">"#);
    html.push_str(&heading(2, &cta.title));
    if !cta.description.trim().is_empty() {
        html.push_str(&format!("\n    <p>{}</p>", escape_html(&cta.description)));
    }
    html.push_str(&button(&cta.button_text, &cta.button_link));
    html.push_str("\n</div>");
    html
}

fn render_features(features: &FeaturesContent, columns: usize) -> String {
    let mut html = String::from(r#"<div class="features-block">"#);
    html.push_str(&heading(2, &features.title));
    html.push_str(&grid_open("feature-items", columns));
    for item in &features.items {
        html.push_str(&format!(
            r#"
        <div class="feature-item"><h3>{}</h3><p>{}</p></div>"#,
            escape_html(&item.title),
            escape_html(&item.description)
        ));
    }
    html.push_str("\n    </div>\n</div>");
    html
}

fn render_testimonials(testimonials: &TestimonialsContent, columns: usize) -> String {
    let mut html = String::from(r#"<div class="testimonials-block">"#);
    html.push_str(&heading(2, &testimonials.title));
    html.push_str(&grid_open("testimonial-items", columns));
    for item in &testimonials.items {
        let role = if item.role.trim().is_empty() {
            String::new()
        } else {
            format!(r#", <span class="role">{}</span>"#, escape_html(&item.role))
        };
        html.push_str(&format!(
            r#"
        <blockquote class="testimonial">{}<footer>{}{}</footer></blockquote>"#,
            escape_html(&item.quote),
            escape_html(&item.author),
            role
        ));
    }
    html.push_str("\n    </div>\n</div>");
    html
}

fn render_faq(faq: &FaqContent) -> String {
    let mut html = String::from(r#"<div class="faq-block">"#);
    html.push_str(&heading(2, &faq.title));
    html.push_str("\n    <dl>");
    for item in &faq.items {
        html.push_str(&format!(
            "\n        <dt>{}</dt><dd>{}</dd>",
            escape_html(&item.question),
            escape_html(&item.answer)
        ));
    }
    html.push_str("\n    </dl>\n</div>");
    html
}

fn render_pricing(pricing: &PricingContent, columns: usize) -> String {
    let mut html = String::from(r#"<div class="pricing-block">"#);
    html.push_str(&heading(2, &pricing.title));
    html.push_str(&grid_open("pricing-plans", columns));
    for plan in &pricing.plans {
        let features: String = plan
            .features
            .iter()
            .map(|f| format!("<li>{}</li>", escape_html(f)))
            .collect();
        html.push_str(&format!(
            r#"
        <div class="pricing-plan"><h3>{}</h3><p class="price">{}</p><ul>{}</ul></div>"#,
            escape_html(&plan.name),
            escape_html(&plan.price),
            features
        ));
    }
    html.push_str("\n    </div>\n</div>");
    html
}

fn render_contact(contact: &ContactContent) -> String {
    let mut html = String::from(r#"<div class="contact-block">"#);
    html.push_str(&heading(2, &contact.title));
    if !contact.email.trim().is_empty() {
        html.push_str(&format!(
            r#"
    <p class="email"><a href="mailto:{0}">{0}</a></p>"#,
            escape_html(&contact.email)
        ));
    }
    if !contact.phone.trim().is_empty() {
        html.push_str(&format!(
            r#"
    <p class="phone">{}</p>"#,
            escape_html(&contact.phone)
        ));
    }
    if !contact.address.trim().is_empty() {
        html.push_str(&format!(
            "\n    <address>{}</address>",
            escape_html(&contact.address)
        ));
    }
    html.push_str("\n</div>");
    html
}
