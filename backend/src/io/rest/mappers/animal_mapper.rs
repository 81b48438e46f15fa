use super::format_time;
use crate::domain::models::Animal;

pub struct AnimalMapper;

impl AnimalMapper {
    pub fn to_dto(domain: Animal) -> shared::Animal {
        shared::Animal {
            id: domain.id,
            name: domain.name,
            description: domain.description,
            discovered_by: domain.discovered_by,
            health: domain.health,
            needs: domain.needs,
            needs_description: domain.needs_description,
            visit_count: domain.visit_count,
            last_visit_at: domain.last_visit_at.as_ref().map(format_time),
            created_at: format_time(&domain.created_at),
        }
    }
}
