use mailgate::tables::IdentifierType;
use mailgate::{ContactEntry, EmailRecord, GatewayEngine};

fn contact(kind: IdentifierType, value: &str, list_type: &str, category: &str) -> ContactEntry {
    ContactEntry {
        identifier_type: kind,
        identifier_value: value.to_string(),
        list_type: list_type.to_string(),
        target_category: category.to_string(),
        recommended_action: "review".to_string(),
        priority: 20,
        notes: None,
    }
}

fn main() -> anyhow::Result<()> {
    println!("🧪 Testing VIP finance routing");

    let engine = GatewayEngine::new(
        vec![
            contact(
                IdentifierType::FromDomain,
                "nordea.fi",
                "vip_finance",
                "financial_news",
            ),
            contact(
                IdentifierType::FromAddress,
                "pasi.penkkala@nordea.fi",
                "vip_personal",
                "business_critical",
            ),
        ],
        Vec::new(),
    );

    let senders = [
        "Nordea <noreply@nordea.fi>",
        "Pasi Penkkala <pasi.penkkala@nordea.fi>",
        "Anna Virtanen <anna.virtanen@nordea.fi>",
        "treasury@nordea.fi",
    ];

    for (i, from) in senders.iter().enumerate() {
        let email = EmailRecord {
            message_id: format!("vip-{}", i + 1),
            from_address: Some(from.to_string()),
            ..Default::default()
        };
        let decision = engine.evaluate(&email);
        let category = decision
            .decision
            .as_ref()
            .map(|v| v.primary_category.as_str())
            .unwrap_or("-");
        println!(
            "   {:<42} → {} ({})",
            from, decision.classification_source, category
        );
        if let Some(reason) = &decision.reason {
            println!("      reason: {reason}");
        }
    }

    println!("✅ Done");
    Ok(())
}
