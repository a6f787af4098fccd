//! Integration tests for full pipeline runs with both renderers.

mod common;

use anyhow::Result;
use common::{
    LAZY_WARNING_SCENARIO, WARNING_SCENARIO, all_pipelines, comrak_pipeline, find_with_class,
    github_pipeline,
};
use gfm_preview::passes::AlertKind;
use gfm_preview::{MatchScope, Pipeline, PipelineOptions};

/// Tests the alert plus footnote scenario end to end.
#[test]
fn test_warning_alert_with_footnote() {
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run(WARNING_SCENARIO);

        // Assert
        let alert = find_with_class(&preview, "div", "alert-warning")
            .unwrap_or_else(|| panic!("{}: should convert alert: {}", name, preview.to_html()));
        assert!(alert.has_class("alert"), "{}: alert class", name);

        let title = find_with_class(&preview, "strong", "alert-title").expect("Should have title");
        assert_eq!(title.text_content(), "WARNING", "{}", name);
        let icon = find_with_class(&preview, "span", "alert-icon").expect("Should have icon");
        assert_eq!(icon.text_content(), AlertKind::Warning.icon(), "{}", name);
        let content = find_with_class(&preview, "div", "alert-content").expect("Should have body");
        assert_eq!(content.text_content().trim(), "Be careful", "{}", name);

        let sup = preview.document.elements("sup");
        assert_eq!(sup.len(), 1, "{}: one reference", name);
        let link = &sup[0].children[0];
        let link = link.as_element().expect("Reference should be a link");
        assert_eq!(link.attr("href"), Some("#footnote-1"), "{}", name);
        assert_eq!(link.text_content(), "1", "{}", name);

        let section = find_with_class(&preview, "div", "footnote").expect("Should have section");
        let entries: Vec<_> = section
            .children
            .iter()
            .filter_map(|node| node.as_element())
            .filter(|element| element.is("p"))
            .collect();
        assert_eq!(entries.len(), 1, "{}", name);
        assert_eq!(entries[0].attr("id"), Some("footnote-1"), "{}", name);
        assert_eq!(entries[0].text_content(), "1. Footnote text", "{}", name);

        assert!(
            !preview.to_html().contains("[^1]"),
            "{}: no footnote syntax should remain: {}",
            name,
            preview.to_html()
        );
    }
}

/// Tests the scenario whose reference line continues the quote.
#[test]
fn test_lazy_reference_line_stays_in_alert() {
    let mut bodies = Vec::new();
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run(LAZY_WARNING_SCENARIO);

        // Assert
        let title = find_with_class(&preview, "strong", "alert-title")
            .unwrap_or_else(|| panic!("{}: should convert alert: {}", name, preview.to_html()));
        assert_eq!(title.text_content(), "WARNING", "{}", name);

        let content = find_with_class(&preview, "div", "alert-content").expect("Should have body");
        assert!(
            content.text_content().starts_with("Be careful"),
            "{}: body should start with the quoted text: {}",
            name,
            content.text_content()
        );
        let sup: Vec<_> = preview.document.elements("sup");
        assert_eq!(sup.len(), 1, "{}", name);
        assert_eq!(sup[0].text_content(), "1", "{}", name);
        let inside: Vec<_> = content
            .children
            .iter()
            .filter_map(|node| node.as_element())
            .flat_map(|p| p.children.iter())
            .filter(|node| node.is_element("sup"))
            .collect();
        assert_eq!(inside.len(), 1, "{}: reference belongs to the alert body", name);

        let section = find_with_class(&preview, "div", "footnote").expect("Should have section");
        assert!(section.text_content().contains("1. Footnote text"), "{}", name);

        bodies.push(content.text_content());
    }

    // Both renderers agree on the body
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0], "Be careful\nRef1");
}

#[test]
fn test_definitions_inside_containers_resolve() {
    for (name, pipeline) in all_pipelines() {
        for source in [
            "> [!NOTE]\n> See[^a]\n>\n> [^a]: word\n",
            "- See[^a]\n- [^a]: word\n",
        ] {
            // Act
            let preview = pipeline.run(source);

            // Assert
            let html = preview.to_html();
            assert!(!html.contains("href=\"word\""), "{}: no link definition: {}", name, html);
            let sup = preview.document.elements("sup");
            assert_eq!(sup.len(), 1, "{}: {}", name, html);
            assert_eq!(sup[0].text_content(), "1", "{}", name);
            let section = find_with_class(&preview, "div", "footnote")
                .unwrap_or_else(|| panic!("{}: should have section: {}", name, html));
            assert!(section.text_content().contains("1. word"), "{}", name);
        }
    }
}

#[test]
fn test_runs_are_deterministic() {
    for (name, pipeline) in all_pipelines() {
        // Arrange
        let source = "# Title\n\n- [x] a\n- [ ] b\n\n> [!TIP]\n> `#fff` @me #4\n\nx[^n]\n\n[^n]: y\n";

        // Act
        let first = pipeline.run(source);
        let second = pipeline.run(source);

        // Assert
        assert_eq!(first, second, "{}: runs should be identical", name);
    }
}

#[test]
fn test_every_alert_keyword() {
    for (name, pipeline) in all_pipelines() {
        for kind in AlertKind::ALL {
            // Arrange
            let source = format!("> [!{}]\n> Body\n", kind.keyword());

            // Act
            let preview = pipeline.run(&source);

            // Assert
            let alert = find_with_class(&preview, "div", &kind.css_class());
            assert!(alert.is_some(), "{}: {} should convert", name, kind.keyword());
            let title = find_with_class(&preview, "strong", "alert-title").expect("Should have title");
            assert_eq!(title.text_content(), kind.keyword());
            assert!(preview.document.elements("blockquote").is_empty());
        }
    }
}

#[test]
fn test_unknown_alert_stays_blockquote() {
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run("> [!UNKNOWN]\n> Body\n");

        // Assert
        assert_eq!(preview.report.alerts, 0, "{}", name);
        assert_eq!(preview.document.elements("blockquote").len(), 1, "{}", name);
    }
}

#[test]
fn test_color_literals_get_one_swatch() {
    for (name, pipeline) in all_pipelines() {
        // Arrange
        let source = "Colors `#abc`, `#aabbcc`, `rgb(1,2,3)`, `hsl(1,2%,3%)` and `plain`.";

        // Act
        let preview = pipeline.run(source);
        let html = preview.to_html();

        // Assert
        let swatches = preview
            .document
            .elements("span")
            .into_iter()
            .filter(|span| span.has_class("color-preview"))
            .count();
        assert_eq!(swatches, 4, "{}: one swatch per color: {}", name, html);
        for color in ["#abc", "#aabbcc", "rgb(1,2,3)", "hsl(1,2%,3%)"] {
            let expected = format!(
                "<span class=\"color-preview\" style=\"background-color: {color}\"></span><code>{color}</code>"
            );
            assert!(html.contains(&expected), "{}: swatch before {}: {}", name, color, html);
        }
        assert!(html.contains("<code>plain</code>"), "{}", name);
    }
}

#[test]
fn test_task_items_with_checked_state() {
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run("- [ ] item\n- [x] done\n");

        // Assert
        let items: Vec<_> = preview
            .document
            .elements("li")
            .into_iter()
            .filter(|li| li.has_class("task-list-item"))
            .collect();
        assert_eq!(items.len(), 2, "{}", name);

        let inputs = preview.document.elements("input");
        assert_eq!(inputs.len(), 2, "{}", name);
        assert_eq!(inputs[0].attr("checked"), None, "{}", name);
        assert_eq!(inputs[1].attr("checked"), Some(""), "{}", name);
        assert_eq!(preview.report.tasks, 2, "{}", name);
    }
}

#[test]
fn test_missing_footnote_stays_literal() {
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run("See[^missing]");

        // Assert
        assert!(preview.to_html().contains("See[^missing]"), "{}", name);
        assert!(find_with_class(&preview, "div", "footnote").is_none(), "{}", name);
    }
}

#[test]
fn test_unreferenced_definition_yields_no_section() {
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run("Text[^a]\n\n[^b]: unused\n");

        // Assert
        assert!(find_with_class(&preview, "div", "footnote").is_none(), "{}", name);
        assert!(!preview.to_html().contains("unused"), "{}", name);
        assert!(preview.to_html().contains("Text[^a]"), "{}", name);
    }
}

#[test]
fn test_repeated_reference_shares_number() {
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run("A[^x] and again B[^x]\n\n[^x]: shared\n");

        // Assert
        let labels: Vec<String> = preview
            .document
            .elements("sup")
            .iter()
            .map(|sup| sup.text_content())
            .collect();
        assert_eq!(labels, vec!["1", "1"], "{}", name);
        assert_eq!(preview.report.footnotes, 1, "{}", name);
    }
}

#[test]
fn test_mentions_and_issue_references() {
    for (name, pipeline) in all_pipelines() {
        // Act
        let preview = pipeline.run("Thanks @octocat, fixes #12");

        // Assert
        let strong = preview.document.elements("strong");
        assert_eq!(strong[0].text_content(), "@octocat", "{}", name);
        let links = preview.document.elements("a");
        assert_eq!(links[0].attr("href"), Some("#issue-12"), "{}", name);
        assert_eq!(links[0].text_content(), "#12", "{}", name);
    }
}

#[test]
fn test_structural_scope_leaves_code_alone() -> Result<()> {
    // Arrange
    let textual = comrak_pipeline();
    let structural = Pipeline::new(
        Some(Box::new(gfm_preview::ComrakRenderer::new())),
        None,
        PipelineOptions {
            scope: MatchScope::Structural,
        },
    );
    let source = "Ping `@admin` and @you\n\n- note arr[x] here\n";

    // Act
    let loose = textual.run(source);
    let narrow = structural.run(source);

    // Assert
    assert!(loose.to_html().contains("&lt;strong&gt;@admin"), "{}", loose.to_html());
    assert_eq!(loose.report.tasks, 1);

    let code = narrow.document.elements("code");
    assert_eq!(code[0].text_content(), "@admin");
    assert_eq!(narrow.document.elements("strong")[0].text_content(), "@you");
    assert_eq!(narrow.report.tasks, 0);
    Ok(())
}

#[test]
fn test_highlighted_code_inside_alert() {
    // Arrange
    let pipeline = github_pipeline();
    let source = "> [!NOTE]\n> ```rust\n> fn main() {}\n> ```\n";

    // Act
    let preview = pipeline.run(source);

    // Assert
    assert_eq!(preview.report.alerts, 1);
    assert_eq!(preview.report.highlighted, 1);
    assert!(preview.to_html().contains("hljs-"), "{}", preview.to_html());
}

#[test]
fn test_stats_follow_source() {
    // Arrange
    let pipeline = comrak_pipeline();

    // Act
    let preview = pipeline.run("one two\nthree");

    // Assert
    assert_eq!(preview.stats.words, 3);
    assert_eq!(preview.stats.lines, 2);
    assert_eq!(preview.stats.characters, 13);
}
