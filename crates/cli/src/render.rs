use packsim_core::CardWithQuantity;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>

<head>
    <meta charset="utf-8">
    <style>
        .grid {
            display: flex;
            flex-flow: wrap;
            justify-content: center;
        }

        .card {
            position: relative;
            margin: 4px;
        }

        .card-image {
            max-width: 100%;
        }

        .quantity {
            margin: 0;
            width: 30%;
            height: 15%;
            display: flex;
            justify-content: center;
            align-items: center;
            position: absolute;
            bottom: 0px;
            right: 0px;
            background-color: rgba(255, 255, 255, 0.3);
            font-size: 2em;
        }
    </style>
</head>

<body>
    <div class="grid">
"#;

const PAGE_TAIL: &str = r#"    </div>
</body>

</html>
"#;

pub fn render_html(cards: &[CardWithQuantity]) -> String {
    let mut out = String::from(PAGE_HEAD);
    for entry in cards {
        out.push_str(&format!(
            "        <div class=\"card\"><img class=\"card-image\" src=\"{}\" alt=\"{}\" title=\"{}\"><p class=\"quantity\">{}</p></div>\n",
            escape(&entry.card.image),
            escape(&entry.card.name),
            escape(&entry.card.id),
            entry.quantity
        ));
    }
    out.push_str(PAGE_TAIL);
    out
}

/// One `<qty> <name> <setCode> <number>` line per card, the deck-list layout
/// the online client imports.
pub fn render_text(cards: &[CardWithQuantity]) -> String {
    cards
        .iter()
        .map(|entry| {
            let code = entry.card.set_code.as_deref().unwrap_or(&entry.card.set);
            format!(
                "{} {} {} {}",
                entry.quantity, entry.card.name, code, entry.card.number
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}
