use super::{DatasetBase, Float, Records};
use crate::error::{Error, Result};
use crate::traits::{Fit, Predict, PredictInplace};
use ndarray::{concatenate, s, Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix1, Ix2};
use rand::{seq::SliceRandom, Rng};

/// Implementation without constraints on records and targets
///
/// This implementation block provides methods for the creation and mutation of datasets.
impl<R: Records, S> DatasetBase<R, S> {
    /// Create a new dataset from records and targets
    ///
    /// # Example
    ///
    /// ```ignore
    /// let dataset = Dataset::new(records, targets);
    /// ```
    pub fn new(records: R, targets: S) -> DatasetBase<R, S> {
        DatasetBase {
            records,
            targets,
            feature_names: Vec::new(),
        }
    }

    /// Returns reference to targets
    pub fn targets(&self) -> &S {
        &self.targets
    }

    /// Returns reference to records
    pub fn records(&self) -> &R {
        &self.records
    }

    /// Updates the records of a dataset
    ///
    /// This function overwrites the records in a dataset. The feature names are dropped, because
    /// the new records need not describe the same features.
    pub fn with_records<T: Records>(self, records: T) -> DatasetBase<T, S> {
        DatasetBase {
            records,
            targets: self.targets,
            feature_names: Vec::new(),
        }
    }

    /// Updates the targets of a dataset
    pub fn with_targets<T>(self, targets: T) -> DatasetBase<R, T> {
        DatasetBase {
            records: self.records,
            targets,
            feature_names: self.feature_names,
        }
    }

    /// Updates the feature names of a dataset
    pub fn with_feature_names<I: Into<String>>(mut self, names: Vec<I>) -> DatasetBase<R, S> {
        let feature_names = names.into_iter().map(|x| x.into()).collect();

        self.feature_names = feature_names;

        self
    }

    /// Returns feature names
    ///
    /// A feature name gives a human-readable string describing the purpose of a single feature.
    /// When no names were set, `feature-0`, `feature-1`, ... are returned instead.
    pub fn feature_names(&self) -> Vec<String> {
        if !self.feature_names.is_empty() {
            self.feature_names.clone()
        } else {
            (0..self.records.nfeatures())
                .map(|idx| format!("feature-{}", idx))
                .collect()
        }
    }

    /// Number of samples in the dataset
    pub fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    /// Number of features in the dataset
    pub fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }
}

/// Records without targets, used by unsupervised algorithms
impl<F, D: Data<Elem = F>> From<ArrayBase<D, Ix2>> for DatasetBase<ArrayBase<D, Ix2>, ()> {
    fn from(records: ArrayBase<D, Ix2>) -> Self {
        DatasetBase::new(records, ())
    }
}

impl<F: Float, D: Data<Elem = F>, T: Data<Elem = F>> DatasetBase<ArrayBase<D, Ix2>, ArrayBase<T, Ix1>> {
    /// Creates a view of a dataset
    pub fn view(&self) -> DatasetBase<ArrayView2<'_, F>, ArrayView1<'_, F>> {
        DatasetBase::new(self.records.view(), self.targets.view())
            .with_feature_names(self.feature_names.clone())
    }

    /// Copy records and targets into an owned dataset
    pub fn to_owned(&self) -> DatasetBase<Array2<F>, Array1<F>> {
        DatasetBase::new(self.records.to_owned(), self.targets.to_owned())
            .with_feature_names(self.feature_names.clone())
    }

    /// Return a subset of the dataset with the given samples, in the given order
    pub fn select_samples(&self, indices: &[usize]) -> DatasetBase<Array2<F>, Array1<F>> {
        DatasetBase::new(
            self.records.select(Axis(0), indices),
            self.targets.select(Axis(0), indices),
        )
        .with_feature_names(self.feature_names.clone())
    }

    /// Return a copy of the dataset restricted to the given features, in the given order
    pub fn select_features(&self, indices: &[usize]) -> DatasetBase<Array2<F>, Array1<F>> {
        let names = self.feature_names();
        let names = indices.iter().map(|i| names[*i].clone()).collect::<Vec<_>>();

        DatasetBase::new(self.records.select(Axis(1), indices), self.targets.to_owned())
            .with_feature_names(names)
    }

    /// Shuffle the samples of a dataset
    ///
    /// Records and targets are permuted together, so every record keeps its response.
    pub fn shuffle<RNG: Rng>(&self, rng: &mut RNG) -> DatasetBase<Array2<F>, Array1<F>> {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        self.select_samples(&indices)
    }

    /// Split dataset into two disjoint chunks
    ///
    /// This function splits the observations in a dataset into two disjoint chunks. The splitting
    /// threshold is calculated with the `ratio`. For example a ratio of `0.9` allocates 90% to the
    /// first chunk and 10% to the second. This is often used in training, validation splitting
    /// procedures.
    pub fn split_with_ratio(
        &self,
        ratio: f32,
    ) -> (
        DatasetBase<Array2<F>, Array1<F>>,
        DatasetBase<Array2<F>, Array1<F>>,
    ) {
        let n = (self.nsamples() as f32 * ratio).ceil() as usize;
        let n = n.min(self.nsamples());

        let first = DatasetBase::new(
            self.records.slice(s![..n, ..]).to_owned(),
            self.targets.slice(s![..n]).to_owned(),
        )
        .with_feature_names(self.feature_names.clone());
        let second = DatasetBase::new(
            self.records.slice(s![n.., ..]).to_owned(),
            self.targets.slice(s![n..]).to_owned(),
        )
        .with_feature_names(self.feature_names.clone());

        (first, second)
    }

    /// Performs k-folding on the dataset
    ///
    /// The dataset is divided into `k` contiguous validation folds. When `k` does not divide the
    /// number of samples, the first `nsamples % k` folds receive one additional sample, so every
    /// sample is validated exactly once. The training set of a fold holds all remaining samples
    /// in their original order.
    ///
    /// ## Parameters
    ///
    /// - `k`: the number of folds to apply
    ///
    /// ## Returns
    ///
    /// A vector of `k` (training, validation) dataset pairs, or `Error::Parameters` if `k` is
    /// smaller than two or larger than the number of samples.
    pub fn fold(
        &self,
        k: usize,
    ) -> Result<
        Vec<(
            DatasetBase<Array2<F>, Array1<F>>,
            DatasetBase<Array2<F>, Array1<F>>,
        )>,
    > {
        let n = self.nsamples();
        if k < 2 || k > n {
            return Err(Error::Parameters(format!(
                "number of folds {} must be in [2, {}]",
                k, n
            )));
        }

        let base = n / k;
        let remainder = n % k;

        let mut res = Vec::with_capacity(k);
        let mut start = 0;
        for i in 0..k {
            let len = base + usize::from(i < remainder);
            let end = start + len;

            let train_records = concatenate(
                Axis(0),
                &[
                    self.records.slice(s![..start, ..]),
                    self.records.slice(s![end.., ..]),
                ],
            )?;
            let train_targets = concatenate(
                Axis(0),
                &[self.targets.slice(s![..start]), self.targets.slice(s![end..])],
            )?;

            let train = DatasetBase::new(train_records, train_targets)
                .with_feature_names(self.feature_names.clone());
            let valid = DatasetBase::new(
                self.records.slice(s![start..end, ..]).to_owned(),
                self.targets.slice(s![start..end]).to_owned(),
            )
            .with_feature_names(self.feature_names.clone());

            res.push((train, valid));
            start = end;
        }

        Ok(res)
    }

    /// Evaluate every parameter set on every fold
    ///
    /// Fits one model per parameter set and fold on the training part and scores the prediction
    /// on the validation part with `eval(prediction, truth)`.
    ///
    /// ## Returns
    ///
    /// An array of shape `(parameters.len(), k)` with the score of each parameter set (rows) on
    /// each fold (columns).
    pub fn cross_validate_folds<O, ER, M, C>(
        &self,
        k: usize,
        parameters: &[M],
        eval: C,
    ) -> std::result::Result<Array2<F>, ER>
    where
        ER: std::error::Error + From<Error>,
        M: Fit<Array2<F>, Array1<F>, ER, Object = O>,
        O: PredictInplace<Array2<F>, Array1<F>>,
        C: Fn(&Array1<F>, &Array1<F>) -> Result<F>,
    {
        let folds = self.fold(k)?;
        let mut scores = Array2::zeros((parameters.len(), k));

        for (i, params) in parameters.iter().enumerate() {
            for (j, (train, valid)) in folds.iter().enumerate() {
                let model = params.fit(train)?;
                let prediction: Array1<F> = model.predict(valid.records());
                scores[(i, j)] = eval(&prediction, valid.targets())?;
            }
        }

        Ok(scores)
    }

    /// Performs cross-validation on the dataset, averaging the score over folds
    ///
    /// ## Parameters
    ///
    /// - `k`: the number of folds to apply
    /// - `parameters`: a list of hyper-parameter sets to compare
    /// - `eval`: closure scoring a prediction against the ground truth
    ///
    /// ## Returns
    ///
    /// The mean validation score of each parameter set.
    ///
    /// ## Example
    ///
    /// ```ignore
    /// let penalties = vec![0.01, 0.1, 1.0];
    /// let models = penalties
    ///     .iter()
    ///     .map(|alpha| Lasso::params().penalty(*alpha))
    ///     .collect::<Vec<_>>();
    ///
    /// let mse = dataset.cross_validate_single(5, &models, |pred, truth| pred.mean_squared_error(truth))?;
    /// ```
    pub fn cross_validate_single<O, ER, M, C>(
        &self,
        k: usize,
        parameters: &[M],
        eval: C,
    ) -> std::result::Result<Array1<F>, ER>
    where
        ER: std::error::Error + From<Error>,
        M: Fit<Array2<F>, Array1<F>, ER, Object = O>,
        O: PredictInplace<Array2<F>, Array1<F>>,
        C: Fn(&Array1<F>, &Array1<F>) -> Result<F>,
    {
        let scores = self.cross_validate_folds(k, parameters, eval)?;

        scores
            .mean_axis(Axis(1))
            .ok_or_else(|| Error::NotEnoughSamples.into())
    }
}
