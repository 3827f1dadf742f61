use chrono::{Days, Local, NaiveDate};
use clap::Args;
use clube_admin::access::{AccessService, Direction, PassageRequest, PersonKind, Venue};
use clube_admin::elections::ElectionService;
use clube_admin::error::AppError;
use clube_admin::finance::FinanceService;
use clube_admin::gateway::{GatewayError, InMemoryGateway, Row, Table};
use serde_json::{json, Value};
use std::sync::Arc;

pub(crate) const DEMO_ELECTION_ID: &str = "eleicao-2026";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the election tally as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}

fn date_after(today: NaiveDate, days: u64) -> String {
    today
        .checked_add_days(Days::new(days))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

fn date_before(today: NaiveDate, days: u64) -> String {
    today
        .checked_sub_days(Days::new(days))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

/// In-process club with a handful of members, an access point per venue, and
/// a closed election.
pub(crate) fn seeded_gateway() -> Result<InMemoryGateway, GatewayError> {
    seeded_gateway_on(Local::now().date_naive())
}

pub(crate) fn seeded_gateway_on(today: NaiveDate) -> Result<InMemoryGateway, GatewayError> {
    let gateway = InMemoryGateway::new();

    let members = [
        json!({ "id": "assoc-ana", "numero_titulo": 1001, "cpf": "12345678901", "nome": "Ana Souza", "plano": "familiar", "status": "ativo", "telefone": "5516999990001" }),
        json!({ "id": "assoc-bruno", "numero_titulo": 1002, "cpf": "23456789012", "nome": "Bruno Lima", "plano": "individual", "status": "ativo", "telefone": "5516999990002" }),
        json!({ "id": "assoc-carla", "numero_titulo": 1003, "cpf": "34567890123", "nome": "Carla Dias", "plano": "familiar", "status": "suspenso" }),
    ];
    for member in members {
        gateway.seed(Table::Members, row(member))?;
    }

    let dependents = [
        json!({ "id": "dep-lia", "associado_id": "assoc-ana", "nome": "Lia Souza", "status": "ativo" }),
        json!({ "id": "dep-tom", "associado_id": "assoc-carla", "nome": "Tom Dias", "status": "ativo" }),
    ];
    for dependent in dependents {
        gateway.seed(Table::Dependents, row(dependent))?;
    }

    let exams = [
        json!({ "id": "exame-ana", "associado_id": "assoc-ana", "data_exame": date_before(today, 60), "data_validade": date_after(today, 120), "resultado": "apto" }),
        json!({ "id": "exame-lia", "dependente_id": "dep-lia", "data_exame": date_before(today, 180), "data_validade": date_before(today, 1), "resultado": "apto" }),
        json!({ "id": "exame-tom", "dependente_id": "dep-tom", "data_exame": date_before(today, 10), "data_validade": date_after(today, 170), "resultado": "apto" }),
    ];
    for exam in exams {
        gateway.seed(Table::MedicalExams, row(exam))?;
    }

    let dues = [
        json!({ "id": "mens-1", "associado_id": "assoc-bruno", "referencia": "2026-08", "valor": 180.0, "data_vencimento": "2026-08-10", "status": "atrasado" }),
        json!({ "id": "mens-2", "associado_id": "assoc-bruno", "referencia": "2026-09", "valor": 180.0, "data_vencimento": "2026-09-10", "status": "atrasado" }),
        json!({ "id": "mens-3", "associado_id": "assoc-ana", "referencia": "2026-09", "valor": 240.0, "valor_pago": 240.0, "data_vencimento": "2026-09-10", "data_pagamento": "2026-09-08", "status": "pago" }),
    ];
    for due in dues {
        gateway.seed(Table::Dues, row(due))?;
    }

    let points = [
        json!({ "id": "ponto-portaria", "nome": "Portaria principal", "tipo": "clube", "ativo": true }),
        json!({ "id": "ponto-piscina", "nome": "Catraca da piscina", "tipo": "piscina", "ativo": true }),
        json!({ "id": "ponto-academia", "nome": "Recepção da academia", "tipo": "academia", "ativo": true }),
    ];
    for point in points {
        gateway.seed(Table::AccessPoints, row(point))?;
    }

    gateway.seed(
        Table::Elections,
        row(json!({
            "id": DEMO_ELECTION_ID,
            "titulo": "Diretoria 2026-2028",
            "data_inicio": "2026-03-01T08:00:00Z",
            "data_fim": "2026-03-01T18:00:00Z",
            "status": "encerrada",
            "mandato_inicio": "2026-04-01",
            "mandato_fim": "2028-03-31"
        })),
    )?;
    for slate in [
        json!({ "id": "chapa-uniao", "eleicao_id": DEMO_ELECTION_ID, "numero": 1, "nome": "União", "proposta": "Reforma da piscina" }),
        json!({ "id": "chapa-renovacao", "eleicao_id": DEMO_ELECTION_ID, "numero": 2, "nome": "Renovação" }),
    ] {
        gateway.seed(Table::Slates, row(slate))?;
    }
    gateway.seed(
        Table::Candidates,
        row(json!({ "id": "cand-1", "chapa_id": "chapa-uniao", "associado_id": "assoc-ana", "cargo": "presidente" })),
    )?;
    let ballots = [(Some("chapa-uniao"), 7), (Some("chapa-renovacao"), 2), (None, 1)];
    let mut voter = 0;
    for (slate, count) in ballots {
        for _ in 0..count {
            voter += 1;
            gateway.seed(
                Table::Ballots,
                row(json!({
                    "id": format!("voto-{voter:03}"),
                    "eleicao_id": DEMO_ELECTION_ID,
                    "associado_id": format!("eleitor-{voter:03}"),
                    "chapa_id": slate
                })),
            )?;
        }
    }

    Ok(gateway)
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let gateway = Arc::new(seeded_gateway_on(today)?);
    let access = AccessService::new(gateway.clone());

    println!("Club front desk demo ({today})");
    let scenarios = [
        ("assoc-ana", PersonKind::Member, Venue::Gym),
        ("assoc-bruno", PersonKind::Member, Venue::Club),
        ("dep-lia", PersonKind::Dependent, Venue::Pool),
        ("dep-tom", PersonKind::Dependent, Venue::Pool),
    ];
    for (person_id, kind, venue) in scenarios {
        let decision = access
            .evaluator()
            .evaluate_on(person_id, kind, venue.clone(), today)
            .await?;
        let verdict = if decision.admitted { "ADMIT" } else { "DENY" };
        println!(
            "- {} ({kind}) at {venue}: {verdict} - {}",
            decision.subject.name(),
            decision.reason
        );
        for warning in &decision.warnings {
            println!("    warning: {warning}");
        }
        if decision.admitted {
            access
                .record_passage(PassageRequest {
                    person_id: person_id.to_string(),
                    person_kind: kind,
                    direction: Direction::In,
                    venue,
                    note: None,
                })
                .await?;
        }
    }

    let stats = access.gate_statistics(None).await?;
    println!(
        "\nGate today: {} in / {} out / ~{} present",
        stats.entries, stats.exits, stats.estimated_present
    );

    let delinquents = FinanceService::new(gateway.clone()).delinquents(1).await?;
    println!("\nDelinquent members");
    for entry in &delinquents {
        let name = entry
            .member
            .as_ref()
            .map(|member| member.name.as_str())
            .unwrap_or("(removed member)");
        println!(
            "- {name}: {} overdue, R$ {:.2} owed",
            entry.overdue.len(),
            entry.total_owed
        );
    }

    let tally = ElectionService::new(gateway).tally(DEMO_ELECTION_ID).await?;
    println!(
        "\nElection '{}': {} ballots, {} blank",
        tally.election.title, tally.total_votes, tally.blank_votes
    );
    for result in &tally.slates {
        println!(
            "- #{} {}: {} votes ({:.2}%)",
            result.slate.number, result.slate.name, result.votes, result.percentage
        );
    }
    if args.json {
        let rendered = serde_json::to_string_pretty(&tally).map_err(std::io::Error::from)?;
        println!("{rendered}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    #[tokio::test]
    async fn seeded_club_reproduces_the_reference_tally() {
        let gateway = Arc::new(seeded_gateway_on(today()).expect("seed"));
        let tally = ElectionService::new(gateway)
            .tally(DEMO_ELECTION_ID)
            .await
            .expect("tally");

        assert_eq!(tally.total_votes, 10);
        assert_eq!(tally.blank_votes, 1);
        assert_eq!(tally.slates[0].slate.name, "União");
        assert_eq!(tally.slates[0].percentage, 70.0);
    }

    #[tokio::test]
    async fn seeded_club_covers_admit_and_deny_paths() {
        let gateway = Arc::new(seeded_gateway_on(today()).expect("seed"));
        let access = AccessService::new(gateway);
        let evaluator = access.evaluator();

        let ana = evaluator
            .evaluate_on("assoc-ana", PersonKind::Member, Venue::Gym, today())
            .await
            .expect("evaluates");
        let bruno = evaluator
            .evaluate_on("assoc-bruno", PersonKind::Member, Venue::Club, today())
            .await
            .expect("evaluates");
        let lia = evaluator
            .evaluate_on("dep-lia", PersonKind::Dependent, Venue::Pool, today())
            .await
            .expect("evaluates");
        let tom = evaluator
            .evaluate_on("dep-tom", PersonKind::Dependent, Venue::Pool, today())
            .await
            .expect("evaluates");

        assert!(ana.admitted);
        assert_eq!(bruno.reason, "delinquent");
        assert!(!lia.admitted);
        assert!(tom.reason.contains("guardian"));
    }

    #[tokio::test]
    async fn demo_runs_end_to_end() {
        run_demo(DemoArgs {
            today: Some(today()),
            json: true,
        })
        .await
        .expect("demo completes");
    }
}
