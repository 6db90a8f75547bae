use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::workflows::applicants::domain::{FieldMap, RecordId, Table};
use crate::workflows::applicants::repository::{
    Filter, Record, RecordRepository, RepositoryError,
};

/// Airtable caps batch create and delete at ten records per request.
const BATCH_PAGE: usize = 10;

/// [`RecordRepository`] over the Airtable REST API, using blocking HTTP to
/// match the pipeline's sequential execution model.
pub struct AirtableRepository {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
}

impl AirtableRepository {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: config.api_key.clone(),
            base_url: format!("https://api.airtable.com/v0/{}", config.base_id),
        }
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url, table.name().replace(' ', "%20"))
    }

    fn list_page(
        &self,
        table: Table,
        filter: &Filter,
        max_records: Option<u32>,
        offset: Option<&str>,
    ) -> Result<RecordPage, RepositoryError> {
        let mut query: Vec<(&str, String)> = vec![("filterByFormula", render_formula(filter))];
        if let Some(max) = max_records {
            query.push(("maxRecords", max.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .client
            .get(self.table_url(table))
            .bearer_auth(&self.api_key)
            .query(&query)
            .send()
            .map_err(transport)?;
        decode(check(response)?)
    }
}

impl RecordRepository for AirtableRepository {
    fn find_first(
        &self,
        table: Table,
        filter: &Filter,
    ) -> Result<Option<Record>, RepositoryError> {
        let page = self.list_page(table, filter, Some(1), None)?;
        Ok(page.records.into_iter().next().map(into_record))
    }

    fn find_all(&self, table: Table, filter: &Filter) -> Result<Vec<Record>, RepositoryError> {
        let mut records = Vec::new();
        let mut offset: Option<String> = None;
        loop {
            let page = self.list_page(table, filter, None, offset.as_deref())?;
            records.extend(page.records.into_iter().map(into_record));
            match page.offset {
                Some(next) => offset = Some(next),
                None => return Ok(records),
            }
        }
    }

    fn create(&self, table: Table, fields: FieldMap) -> Result<Record, RepositoryError> {
        let response = self
            .client
            .post(self.table_url(table))
            .bearer_auth(&self.api_key)
            .json(&WriteRecord { fields })
            .send()
            .map_err(transport)?;
        let payload: RecordPayload = decode(check(response)?)?;
        Ok(into_record(payload))
    }

    fn update(
        &self,
        table: Table,
        id: &RecordId,
        fields: FieldMap,
    ) -> Result<Record, RepositoryError> {
        let response = self
            .client
            .patch(format!("{}/{}", self.table_url(table), id.0))
            .bearer_auth(&self.api_key)
            .json(&WriteRecord { fields })
            .send()
            .map_err(transport)?;
        let payload: RecordPayload = decode(check(response)?)?;
        Ok(into_record(payload))
    }

    fn batch_create(
        &self,
        table: Table,
        rows: Vec<FieldMap>,
    ) -> Result<Vec<Record>, RepositoryError> {
        let mut created = Vec::with_capacity(rows.len());
        for chunk in rows.chunks(BATCH_PAGE) {
            let body = WriteBatch {
                records: chunk
                    .iter()
                    .map(|fields| WriteRecord {
                        fields: fields.clone(),
                    })
                    .collect(),
            };
            let response = self
                .client
                .post(self.table_url(table))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .map_err(transport)?;
            let page: RecordBatch = decode(check(response)?)?;
            created.extend(page.records.into_iter().map(into_record));
        }
        Ok(created)
    }

    fn batch_delete(&self, table: Table, ids: &[RecordId]) -> Result<(), RepositoryError> {
        for chunk in ids.chunks(BATCH_PAGE) {
            let query: Vec<(&str, &str)> = chunk
                .iter()
                .map(|id| ("records[]", id.0.as_str()))
                .collect();
            let response = self
                .client
                .delete(self.table_url(table))
                .bearer_auth(&self.api_key)
                .query(&query)
                .send()
                .map_err(transport)?;
            check(response)?;
        }
        Ok(())
    }
}

/// Render a filter into the store's formula language.
fn render_formula(filter: &Filter) -> String {
    match filter {
        Filter::Eq { field, value } => format!("{{{field}}}={}", render_value(value)),
        Filter::Any(filters) => {
            let rendered = filters
                .iter()
                .map(render_formula)
                .collect::<Vec<_>>()
                .join(",");
            format!("OR({rendered})")
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => format!("'{}'", text.replace('\'', "\\'")),
        Value::Number(number) => number.to_string(),
        Value::Bool(true) => "TRUE()".to_string(),
        Value::Bool(false) => "FALSE()".to_string(),
        _ => "''".to_string(),
    }
}

fn check(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, RepositoryError> {
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(RepositoryError::NotFound);
    }
    if !status.is_success() {
        let detail = response.text().unwrap_or_default();
        return Err(RepositoryError::Unavailable(format!("{status}: {detail}")));
    }
    Ok(response)
}

fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, RepositoryError> {
    response.json().map_err(transport)
}

fn transport(err: reqwest::Error) -> RepositoryError {
    RepositoryError::Unavailable(err.to_string())
}

fn into_record(payload: RecordPayload) -> Record {
    Record {
        id: RecordId(payload.id),
        fields: payload.fields,
    }
}

#[derive(Debug, Deserialize)]
struct RecordPayload {
    id: String,
    #[serde(default)]
    fields: FieldMap,
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    #[serde(default)]
    records: Vec<RecordPayload>,
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordBatch {
    #[serde(default)]
    records: Vec<RecordPayload>,
}

#[derive(Debug, Serialize)]
struct WriteRecord {
    fields: FieldMap,
}

#[derive(Debug, Serialize)]
struct WriteBatch {
    records: Vec<WriteRecord>,
}
