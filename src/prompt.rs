//! Prompt construction for the itinerary model
//!
//! The prompt is plain substitution into a fixed template. Nothing here
//! branches on the request values.

use crate::models::TripRequest;

/// Build the instruction sent to the model for one trip
#[must_use]
pub fn build_prompt(request: &TripRequest) -> String {
    format!(
        "Aja como um especialista em viagens global. Quero que você crie um roteiro de viagem \
personalizado e detalhado, dia a dia.

**Contexto da Viagem:**
* **Destino:** {destination}
* **Duração:** {days} dias
* **Estilo de Viagem:** {style}
* **Orçamento:** {budget}
* **Interesses Principais:** {interests}

**Sua Tarefa:**
1. Crie um itinerário dia a dia (Dia 1, Dia 2, ...).
2. Para cada dia, sugira atividades (manhã, tarde, noite) que se encaixem perfeitamente \
no estilo de viagem e nos interesses mencionados.
3. Inclua sugestões de tipos de restaurantes ou pratos locais (alinhados ao orçamento).
4. Dê dicas práticas sobre transporte local ou costumes.
5. O tom deve ser empolgante e encorajador.
6. O formato da resposta deve ser em Markdown, bem estruturado.
",
        destination = request.destination(),
        days = request.duration().days(),
        style = request.style().label(),
        budget = request.budget().label(),
        interests = request.interests(),
    )
}

/// Text shown while the itinerary is being generated
#[must_use]
pub fn progress_message(request: &TripRequest) -> String {
    format!(
        "Mapeando a viagem perfeita de {} para {}...",
        request.style().label(),
        request.destination()
    )
}
