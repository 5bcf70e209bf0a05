use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::DBService;
use serde_json::{Value, json};
use server::{AppState, app};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = DBService::new_in_memory().await.unwrap();
    app(AppState::new(db))
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn send_get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Creates a curso and a professor and returns their ids.
async fn seed_referencias(app: &Router) -> (String, String) {
    let (status, curso) = send_json(
        app,
        "POST",
        "/api/cursos",
        json!({ "nome": "Análise e Desenvolvimento de Sistemas" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, professor) = send_json(
        app,
        "POST",
        "/api/professores",
        json!({
            "nome": "João Lima",
            "email": "joao@exemplo.edu.br",
            "matricula_siape": "7654321"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    (
        curso["data"]["id"].as_str().unwrap().to_string(),
        professor["data"]["id"].as_str().unwrap().to_string(),
    )
}

fn plano_body(curso_id: &str, professor_id: &str) -> Value {
    json!({
        "titulo": "Estruturas de Dados 2025/1",
        "abreviatura": "ED",
        "periodo_numero": 2,
        "curso_id": curso_id,
        "professor_id": professor_id,
        "disciplina": "Estruturas de Dados",
        "ano_periodo": "2025/1",
        "carga_horaria_total": 60.0,
        "carga_horaria_presencial": 48.0,
        "carga_horaria_teorica": 30.0,
        "carga_horaria_pratica": 30.0,
        "carga_horaria_semanal": 4.0,
        "carga_horaria_distancia": 12.0,
        "ementa": "Listas, pilhas, filas e árvores.",
        "objetivos_especificos": [
            { "id": "0c2e7a4e-9d1f-4b5a-8f8e-111111111111", "titulo": "Implementar listas", "ordem": 0 }
        ],
        "bibliografia_basica": ["CORMEN, T. et al. Algoritmos."]
    })
}

#[tokio::test]
async fn create_then_fetch_plano() {
    let app = test_app().await;
    let (curso_id, professor_id) = seed_referencias(&app).await;

    let (status, created) = send_json(
        &app,
        "POST",
        "/api/planos",
        plano_body(&curso_id, &professor_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["periodo"], "2º Período");
    assert_eq!(created["data"]["carga_horaria_presencial_percentual"], 80.0);
    assert_eq!(created["data"]["status"], "rascunho");

    let (status, fetched) = send_get(&app, &format!("/api/planos/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["titulo"], "Estruturas de Dados 2025/1");
    assert_eq!(
        fetched["data"]["objetivos_especificos"][0]["titulo"],
        "Implementar listas"
    );
    assert_eq!(
        fetched["data"]["bibliografia_basica"][0],
        "CORMEN, T. et al. Algoritmos."
    );
}

#[tokio::test]
async fn get_unknown_plano_is_404() {
    let app = test_app().await;
    let (status, body) = send_get(
        &app,
        "/api/planos/9b2f64de-0000-4000-8000-000000000000",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_replaces_record_and_finalizes() {
    let app = test_app().await;
    let (curso_id, professor_id) = seed_referencias(&app).await;
    let (_, created) = send_json(
        &app,
        "POST",
        "/api/planos",
        plano_body(&curso_id, &professor_id),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let mut body = plano_body(&curso_id, &professor_id);
    body["titulo"] = json!("Estruturas de Dados 2025/2");
    body["ano_periodo"] = json!("2025/2");
    body["status"] = json!("finalizado");

    let (status, updated) = send_json(&app, "PUT", &format!("/api/planos/{id}"), body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["titulo"], "Estruturas de Dados 2025/2");
    assert_eq!(updated["data"]["status"], "finalizado");
    assert_eq!(updated["data"]["finalizado"], true);
}

#[tokio::test]
async fn list_filters_by_busca_and_status() {
    let app = test_app().await;
    let (curso_id, professor_id) = seed_referencias(&app).await;
    send_json(
        &app,
        "POST",
        "/api/planos",
        plano_body(&curso_id, &professor_id),
    )
    .await;
    let mut outro = plano_body(&curso_id, &professor_id);
    outro["titulo"] = json!("Banco de Dados 2025/1");
    outro["disciplina"] = json!("Banco de Dados");
    outro["status"] = json!("finalizado");
    send_json(&app, "POST", "/api/planos", outro).await;

    let (_, todos) = send_get(&app, "/api/planos").await;
    assert_eq!(todos["data"].as_array().unwrap().len(), 2);

    let (_, por_busca) = send_get(&app, "/api/planos?busca=banco").await;
    assert_eq!(por_busca["data"].as_array().unwrap().len(), 1);
    assert_eq!(por_busca["data"][0]["disciplina"], "Banco de Dados");

    let (_, por_status) = send_get(&app, "/api/planos?status=rascunho").await;
    assert_eq!(por_status["data"].as_array().unwrap().len(), 1);
    assert_eq!(
        por_status["data"][0]["titulo"],
        "Estruturas de Dados 2025/1"
    );
}

#[tokio::test]
async fn resumo_counts_finalizados_per_curso_periodo() {
    let app = test_app().await;
    let (curso_id, professor_id) = seed_referencias(&app).await;
    send_json(
        &app,
        "POST",
        "/api/planos",
        plano_body(&curso_id, &professor_id),
    )
    .await;
    let mut finalizado = plano_body(&curso_id, &professor_id);
    finalizado["status"] = json!("finalizado");
    send_json(&app, "POST", "/api/planos", finalizado).await;

    let (status, resumo) = send_get(&app, "/api/planos/resumo").await;
    assert_eq!(status, StatusCode::OK);
    let linhas = resumo["data"].as_array().unwrap();
    assert_eq!(linhas.len(), 1);
    assert_eq!(linhas[0]["periodo"], "2º Período");
    assert_eq!(linhas[0]["total"], 1);
    assert_eq!(
        linhas[0]["curso_nome"],
        "Análise e Desenvolvimento de Sistemas"
    );
}

#[tokio::test]
async fn export_refuses_draft() {
    let app = test_app().await;
    let (curso_id, professor_id) = seed_referencias(&app).await;
    let (_, created) = send_json(
        &app,
        "POST",
        "/api/planos",
        plano_body(&curso_id, &professor_id),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/planos/{id}/pdf"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_plano_then_404() {
    let app = test_app().await;
    let (curso_id, professor_id) = seed_referencias(&app).await;
    let (_, created) = send_json(
        &app,
        "POST",
        "/api/planos",
        plano_body(&curso_id, &professor_id),
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/planos/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _) = send_get(&app, &format!("/api/planos/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Assembles a minimal single-page PDF with one text line per entry, enough
/// for the text extractor to read back.
fn pdf_minimo(linhas: &[&str]) -> Vec<u8> {
    let mut content = String::from("BT /F1 12 Tf 72 760 Td 14 TL\n");
    for linha in linhas {
        // Parentheses delimit PDF literal strings and must be escaped.
        let escapada = linha
            .replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)");
        content.push_str(&format!("({escapada}) Tj T*\n"));
    }
    content.push_str("ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (numero, object) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{object}\nendobj\n", numero + 1));
    }
    let xref_start = pdf.len();
    pdf.push_str(&format!(
        "xref\n0 {}\n0000000000 65535 f \n",
        objects.len() + 1
    ));
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF",
        objects.len() + 1
    ));
    pdf.into_bytes()
}

async fn send_pdf(
    app: &Router,
    professor_id: &str,
    filename: &str,
    pdf: &[u8],
) -> (StatusCode, Value) {
    let boundary = "fronteira-teste";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"arquivo\"; \
             filename=\"{filename}\"\r\nContent-Type: application/pdf\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(pdf);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/planos/importar?professor_id={professor_id}"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn importar_persists_draft_from_pdf() {
    let app = test_app().await;
    let (curso_id, professor_id) = seed_referencias(&app).await;
    let pdf = pdf_minimo(&[
        "Curso: Desenvolvimento de Sistemas Periodo: 2",
        "Componente Curricular: Algoritmos abreviatura: ALG",
        "2) Ementa",
        "Estudo de algoritmos.",
        "3) Objetivos",
    ]);

    let (status, body) = send_pdf(&app, &professor_id, "MeuPlano.pdf", &pdf).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["titulo"], "MeuPlano");
    assert_eq!(body["data"]["status"], "rascunho");
    assert_eq!(body["data"]["finalizado"], false);
    assert_eq!(body["data"]["curso_id"], curso_id);
    assert_eq!(body["data"]["professor_id"], professor_id);
    // Template defaults fill whatever the extraction missed.
    assert_eq!(body["data"]["carga_horaria_total"], 60.0);

    let (_, listados) = send_get(&app, "/api/planos?status=rascunho").await;
    assert_eq!(listados["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn importar_without_registered_curso_is_rejected() {
    let app = test_app().await;
    let (_, professor) = send_json(
        &app,
        "POST",
        "/api/professores",
        json!({
            "nome": "Ana Costa",
            "email": "ana@exemplo.edu.br",
            "matricula_siape": "1112223"
        }),
    )
    .await;
    let professor_id = professor["data"]["id"].as_str().unwrap().to_string();

    let pdf = pdf_minimo(&["2) Ementa", "Conteudo de teste."]);
    let (status, body) = send_pdf(&app, &professor_id, "Plano.pdf", &pdf).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("curso"));
}

#[tokio::test]
async fn cursos_crud() {
    let app = test_app().await;
    let (status, created) = send_json(&app, "POST", "/api/cursos", json!({ "nome": "Redes" })).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, fetched) = send_get(&app, &format!("/api/cursos/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["nome"], "Redes");

    let (_, updated) = send_json(
        &app,
        "PUT",
        &format!("/api/cursos/{id}"),
        json!({ "nome": "Redes de Computadores" }),
    )
    .await;
    assert_eq!(updated["data"]["nome"], "Redes de Computadores");

    let (_, listed) = send_get(&app, "/api/cursos").await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}
