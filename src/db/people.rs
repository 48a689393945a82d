//! Team member repository.
//!
//! `order` ranks people within their chapter. Moves renumber the affected chapter
//! densely from zero; other chapters are never touched.

use std::sync::Arc;

use super::{keys, position_of, Collection};
use crate::errors::AppError;
use crate::models::{
    Chapter, MoveDirection, OrderUpdate, Person, PersonInput, PERSON_PLACEHOLDER_IMAGE,
};
use crate::store::DocumentStore;
use crate::upload::{freshly_uploaded, log_orphaned_upload, ImageFile, ImageUploader};
use crate::validation::{validate_image_ref, Schema};

pub struct PeopleRepository {
    collection: Collection<Person>,
    uploader: Arc<ImageUploader>,
}

impl PeopleRepository {
    pub fn new(store: Arc<dyn DocumentStore>, uploader: Arc<ImageUploader>) -> Self {
        Self {
            collection: Collection::new(store, keys::PEOPLE),
            uploader,
        }
    }

    /// Everyone, in stored order. Never fails.
    pub async fn list_all(&self) -> Vec<Person> {
        self.collection.list_all().await
    }

    /// One chapter's people sorted by `order`. Never fails.
    pub async fn list_by_chapter(&self, chapter: Chapter) -> Vec<Person> {
        let mut people: Vec<Person> = self
            .list_all()
            .await
            .into_iter()
            .filter(|p| in_chapter(p, chapter))
            .collect();
        people.sort_by_key(|p| p.order);
        people
    }

    pub async fn initialize_defaults(&self, defaults: &[Person]) -> Result<bool, AppError> {
        self.collection.initialize_defaults(defaults).await
    }

    /// Validate and append a person. Without an explicit order they go last in
    /// their chapter.
    pub async fn add(
        &self,
        mut input: PersonInput,
        image_file: Option<ImageFile>,
    ) -> Result<Person, AppError> {
        let chapter = validated_chapter(&mut input)?;

        let mut people = self.collection.load().await?;
        let image = self
            .uploader
            .resolve(image_file.as_ref(), input.image.as_deref())
            .await?
            .unwrap_or_else(|| PERSON_PLACEHOLDER_IMAGE.to_string());
        let uploaded = freshly_uploaded(image_file.as_ref(), &image, input.image.as_deref());

        let order = input
            .order
            .unwrap_or_else(|| next_order(&people, chapter, None));
        let person = Person {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name,
            role: input.role,
            chapter: chapter.as_str().to_string(),
            image,
            description: input.description,
            order,
        };
        people.push(person.clone());
        self.collection
            .save(&people)
            .await
            .inspect_err(|_| log_orphaned_upload(uploaded, &person.image))?;

        tracing::info!("Added {} to {} ({})", person.name, person.chapter, person.id);
        Ok(person)
    }

    /// Replace the person with `id`. Moving to another chapter without an explicit
    /// order places them last there.
    pub async fn update(
        &self,
        id: &str,
        mut input: PersonInput,
        image_file: Option<ImageFile>,
    ) -> Result<Person, AppError> {
        let chapter = validated_chapter(&mut input)?;

        let mut people = self.collection.load().await?;
        let index = position_of(&people, id, "Person")?;
        let existing = &people[index];

        let image = self
            .uploader
            .resolve(image_file.as_ref(), input.image.as_deref())
            .await?
            .unwrap_or_else(|| existing.image.clone());
        let uploaded = freshly_uploaded(image_file.as_ref(), &image, input.image.as_deref());

        let order = match input.order {
            Some(order) => order,
            None if in_chapter(existing, chapter) => existing.order,
            None => next_order(&people, chapter, Some(id)),
        };
        let person = Person {
            id: id.to_string(),
            name: input.name,
            role: input.role,
            chapter: chapter.as_str().to_string(),
            image,
            description: input.description,
            order,
        };
        people[index] = person.clone();
        self.collection
            .save(&people)
            .await
            .inspect_err(|_| log_orphaned_upload(uploaded, &person.image))?;

        tracing::info!("Updated person {}", id);
        Ok(person)
    }

    /// Delete by id; deleting an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        if self.collection.remove(id).await? {
            tracing::info!("Deleted person {}", id);
        }
        Ok(())
    }

    /// Apply new `order` values to matching ids, then store the whole collection
    /// sorted by order. Unknown ids are ignored.
    pub async fn reorder(&self, updates: &[OrderUpdate]) -> Result<Vec<Person>, AppError> {
        if let Some(bad) = updates.iter().find(|u| u.order < 0) {
            return Err(AppError::validation(
                "order",
                format!("Order for {} must be a non-negative whole number", bad.id),
            ));
        }

        let mut people = self.collection.load().await?;
        for update in updates {
            if let Some(person) = people.iter_mut().find(|p| p.id == update.id) {
                person.order = update.order;
            }
        }
        people.sort_by_key(|p| p.order);
        self.collection.save(&people).await?;

        tracing::info!("Reordered {} people", updates.len());
        Ok(people)
    }

    /// Swap a person with their neighbour in the chapter and renumber that chapter
    /// 0..n. Moving past either end leaves the order unchanged. Returns the chapter
    /// in its new order.
    pub async fn move_person(
        &self,
        id: &str,
        direction: MoveDirection,
    ) -> Result<Vec<Person>, AppError> {
        let mut people = self.collection.load().await?;
        let index = position_of(&people, id, "Person")?;
        let chapter_name = people[index].chapter.clone();

        // Indices into `people` for this chapter, in display order.
        let mut ranked: Vec<usize> = people
            .iter()
            .enumerate()
            .filter(|(_, p)| p.chapter == chapter_name)
            .map(|(i, _)| i)
            .collect();
        ranked.sort_by_key(|&i| people[i].order);

        let Some(at) = ranked.iter().position(|&i| i == index) else {
            return Err(AppError::Internal(format!("Person {} vanished from chapter", id)));
        };
        let target = match direction {
            MoveDirection::Up => at.checked_sub(1),
            MoveDirection::Down => Some(at + 1).filter(|&t| t < ranked.len()),
        };
        if let Some(target) = target {
            ranked.swap(at, target);
        }

        for (rank, &i) in ranked.iter().enumerate() {
            people[i].order = rank as i64;
        }
        self.collection.save(&people).await?;

        tracing::info!("Moved person {} {:?}", id, direction);
        Ok(ranked.into_iter().map(|i| people[i].clone()).collect())
    }
}

fn in_chapter(person: &Person, chapter: Chapter) -> bool {
    Chapter::parse(&person.chapter) == Some(chapter)
}

fn next_order(people: &[Person], chapter: Chapter, exclude_id: Option<&str>) -> i64 {
    people
        .iter()
        .filter(|p| in_chapter(p, chapter) && Some(p.id.as_str()) != exclude_id)
        .map(|p| p.order.saturating_add(1))
        .max()
        .unwrap_or(0)
}

fn validated_chapter(input: &mut PersonInput) -> Result<Chapter, AppError> {
    input.normalize();
    input.check()?;
    if let Some(image) = &input.image {
        validate_image_ref("image", image)?;
    }
    Chapter::parse(&input.chapter)
        .ok_or_else(|| AppError::validation("chapter", "Chapter is not recognised"))
}
