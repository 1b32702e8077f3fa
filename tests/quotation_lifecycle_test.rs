mod common;

use common::{date, TestApp};
use erms_quotation::{
    errors::ServiceError,
    events::Event,
    repositories::FormFilter,
    services::quotations::{FormPatch, NewQuotationForm},
};

fn form_dated(on: chrono::NaiveDate) -> NewQuotationForm {
    NewQuotationForm {
        quotation_date: Some(on),
        payment_terms: Some("50% advance".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn first_quotation_of_the_year_starts_at_one() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;

    let form = app
        .quotations
        .create_form_dated(rajesh.id, party.id, form_dated(date(2024, 5, 1)), date(2024, 5, 1))
        .await
        .unwrap();

    assert_eq!(form.quotation_number, "RAJ/QT/24-25-001");
    assert_eq!(form.party_id, party.id);
    assert_eq!(form.salesman_id, rajesh.id);
    assert_eq!(form.payment_terms.as_deref(), Some("50% advance"));
}

#[tokio::test]
async fn next_quotation_increments_the_serial() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    let today = date(2024, 5, 1);

    let first = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();
    let second = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();

    assert_eq!(first.quotation_number, "RAJ/QT/24-25-001");
    assert_eq!(second.quotation_number, "RAJ/QT/24-25-002");
    assert!(second.id > first.id);
}

#[tokio::test]
async fn financial_year_rolls_over_on_first_of_april() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;

    let march = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), date(2024, 3, 31))
        .await
        .unwrap();
    let april = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), date(2024, 4, 1))
        .await
        .unwrap();

    assert_eq!(march.quotation_number, "RAJ/QT/23-24-001");
    assert_eq!(april.quotation_number, "RAJ/QT/24-25-001");
}

#[tokio::test]
async fn short_names_are_not_padded() {
    let app = TestApp::new().await;
    let al = app.seed_salesman("Al").await;
    let party = app.seed_party(al.id, "Blue Hills").await;

    let form = app
        .quotations
        .create_form_dated(al.id, party.id, NewQuotationForm::default(), date(2024, 5, 1))
        .await
        .unwrap();

    assert_eq!(form.quotation_number, "AL/QT/24-25-001");
}

#[tokio::test]
async fn empty_first_name_gives_an_empty_prefix() {
    let app = TestApp::new().await;
    let nameless = app.insert_raw_salesman("").await;
    let party = app.seed_party(nameless.id, "Acme Traders").await;

    let form = app
        .quotations
        .create_form_dated(nameless.id, party.id, NewQuotationForm::default(), date(2024, 5, 1))
        .await
        .unwrap();

    assert_eq!(form.quotation_number, "/QT/24-25-001");
}

#[tokio::test]
async fn serial_is_shared_by_all_salesmen_in_a_year() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let al = app.seed_salesman("Al").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    let today = date(2024, 7, 15);

    let a = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();
    let b = app
        .quotations
        .create_form_dated(al.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();

    assert_eq!(a.quotation_number, "RAJ/QT/24-25-001");
    assert_eq!(b.quotation_number, "AL/QT/24-25-002");
}

#[tokio::test]
async fn counter_is_seeded_from_existing_forms() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    app.insert_raw_form("OLD/QT/24-25-041", rajesh.id, party.id).await;
    // Other years never influence the seed
    app.insert_raw_form("OLD/QT/23-24-900", rajesh.id, party.id).await;

    let form = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), date(2024, 9, 1))
        .await
        .unwrap();

    assert_eq!(form.quotation_number, "RAJ/QT/24-25-042");
}

#[tokio::test]
async fn malformed_stored_number_is_reported() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    app.insert_raw_form("RAJ/QT/24-25-draft", rajesh.id, party.id).await;

    let err = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), date(2024, 9, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::MalformedState(_)), "{err:?}");
    // Nothing was written
    assert_eq!(app.quotations.list_forms().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_salesman_or_party_is_not_found() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    let today = date(2024, 5, 1);

    let err = app
        .quotations
        .create_form_dated(9_999, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = app
        .quotations
        .create_form_dated(rajesh.id, 9_999, NewQuotationForm::default(), today)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // A failed create must not consume a serial
    let form = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();
    assert_eq!(form.quotation_number, "RAJ/QT/24-25-001");
}

#[tokio::test]
async fn partial_update_only_touches_supplied_fields() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    let due = date(2024, 6, 30);

    let created = app
        .quotations
        .create_form_dated(
            rajesh.id,
            party.id,
            NewQuotationForm {
                due_date: Some(due),
                po_no: Some("PO1".to_string()),
                lut: Some(true),
                ..Default::default()
            },
            date(2024, 5, 1),
        )
        .await
        .unwrap();

    let updated = app
        .quotations
        .update_form(
            created.id,
            FormPatch {
                po_no: Some("PO2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.po_no.as_deref(), Some("PO2"));
    assert_eq!(updated.due_date, Some(due));
    assert_eq!(updated.lut, Some(true));
    assert_eq!(updated.quotation_number, created.quotation_number);

    let reloaded = app.quotations.get_form(created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.po_no.as_deref(), Some("PO2"));
    assert_eq!(reloaded.due_date, Some(due));
}

#[tokio::test]
async fn updating_a_missing_form_is_not_found() {
    let app = TestApp::new().await;

    let err = app
        .quotations
        .update_form(42, FormPatch::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn patching_in_a_taken_number_conflicts() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    let today = date(2024, 5, 1);

    let first = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();
    let second = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();

    let err = app
        .quotations
        .update_form(
            second.id,
            FormPatch {
                quotation_number: Some(first.quotation_number.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)), "{err:?}");
}

#[tokio::test]
async fn list_is_ordered_and_delete_is_idempotent() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;
    let today = date(2024, 5, 1);

    let mut ids = Vec::new();
    for _ in 0..3 {
        let form = app
            .quotations
            .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
            .await
            .unwrap();
        ids.push(form.id);
    }

    let listed: Vec<i64> = app
        .quotations
        .list_forms()
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    assert_eq!(listed, ids);

    app.quotations.delete_form(ids[1]).await.unwrap();
    app.quotations.delete_form(ids[1]).await.unwrap();
    app.quotations.delete_form(12_345).await.unwrap();

    assert!(app.quotations.get_form(ids[1]).await.unwrap().is_none());
    assert_eq!(app.quotations.list_forms().await.unwrap().len(), 2);

    // Deleted serials are never reissued
    let next = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), today)
        .await
        .unwrap();
    assert_eq!(next.quotation_number, "RAJ/QT/24-25-004");
}

#[tokio::test]
async fn search_filters_combine() {
    let app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let al = app.seed_salesman("Al").await;
    let acme = app.seed_party(rajesh.id, "Acme Traders").await;
    let blue = app.seed_party(al.id, "Blue Hills").await;
    let today = date(2024, 5, 1);

    for (salesman, party, on) in [
        (rajesh.id, acme.id, date(2024, 5, 1)),
        (rajesh.id, acme.id, date(2024, 6, 1)),
        (al.id, blue.id, date(2024, 6, 15)),
    ] {
        app.quotations
            .create_form_dated(salesman, party, form_dated(on), today)
            .await
            .unwrap();
    }

    let by_salesman = app
        .quotations
        .search_forms(FormFilter {
            salesman_id: Some(rajesh.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_salesman.len(), 2);

    let by_party_and_prefix = app
        .quotations
        .search_forms(FormFilter {
            party_id: Some(blue.id),
            number_contains: Some("AL/QT".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_party_and_prefix.len(), 1);
    assert_eq!(by_party_and_prefix[0].quotation_number, "AL/QT/24-25-003");

    let june = app
        .quotations
        .search_forms(FormFilter {
            from_date: Some(date(2024, 6, 1)),
            to_date: Some(date(2024, 6, 15)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(june.len(), 2);

    let everything = app.quotations.search_forms(FormFilter::default()).await.unwrap();
    assert_eq!(everything.len(), 3);
}

#[tokio::test]
async fn mutations_publish_events() {
    let mut app = TestApp::new().await;
    let rajesh = app.seed_salesman("Rajesh").await;
    let party = app.seed_party(rajesh.id, "Acme Traders").await;

    let form = app
        .quotations
        .create_form_dated(rajesh.id, party.id, NewQuotationForm::default(), date(2024, 5, 1))
        .await
        .unwrap();
    app.quotations
        .update_form(
            form.id,
            FormPatch {
                lut: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.quotations.delete_form(form.id).await.unwrap();

    assert_eq!(
        app.drain_events(),
        vec![
            Event::SalesmanCreated(rajesh.id),
            Event::PartyCreated {
                party_id: party.id,
                salesman_id: rajesh.id,
            },
            Event::QuotationCreated {
                form_id: form.id,
                quotation_number: "RAJ/QT/24-25-001".to_string(),
            },
            Event::QuotationUpdated(form.id),
            Event::QuotationDeleted(form.id),
        ]
    );
}
