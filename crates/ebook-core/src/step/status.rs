use serde::Serialize;

/// Estado derivado de un step dentro de un flujo, para mostrar.
///
/// Se calcula desde el registro persistido en cada llamada a `status` y
/// nunca se guarda:
/// - `Completed` si el step está en `steps_completed`;
/// - `Running` para el step actual mientras hay una generación en curso;
/// - `Failed` para el step actual si `last_error` tiene valor;
/// - `Current` para el step actual en otro caso;
/// - `Pending` para todo lo demás.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Current,
    Running,
    Completed,
    Failed,
}
